use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng as _;
use rayon::prelude::*;

use gravetide::card::{Card, CardRegistry};
use gravetide::rng::SimRng;
use gravetide::sim::analyze;
use gravetide::sim::deck::{parse_deck_file, spell_counts};
use gravetide::sim::engine::{run_game, GameResult};
use gravetide::sim::optimize::{self, SaveParams};
use gravetide::sim::stats;

#[derive(Parser)]
#[command(name = "gravetide")]
#[command(about = "Monte Carlo goldfish simulator for a UBG reanimator deck", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Deck file to simulate
    #[arg(short, long, default_value = "deck.txt")]
    deck: String,

    /// Base seed for reproducible batches
    #[arg(short, long)]
    seed: Option<u32>,

    /// Narrate the first game
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate a batch of games (the default)
    Run {
        /// Number of games
        #[arg(short = 'n', long, default_value = "1000")]
        games: usize,

        #[arg(short, long, default_value = "deck.txt")]
        deck: String,

        #[arg(short, long)]
        seed: Option<u32>,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Run two deck files head to head
    Compare {
        deck1: String,
        deck2: String,

        /// Games per deck
        #[arg(short = 'n', long, default_value = "1000")]
        games: usize,
    },

    /// Random-search the mana base
    Optimize {
        /// Land configurations to sample
        #[arg(short, long, default_value = "100")]
        configs: usize,

        /// Games per configuration
        #[arg(short, long, default_value = "1000")]
        games: usize,

        /// "weighted" or "shuffle"
        #[arg(short, long, default_value = "weighted")]
        strategy: String,

        /// Deck file providing the fixed spell package
        #[arg(short, long, default_value = "deck.txt")]
        deck: String,
    },

    /// Classify turn-4 combo failures
    Analyze {
        #[arg(short = 'n', long, default_value = "1000")]
        games: usize,

        #[arg(short, long, default_value = "deck.txt")]
        deck: String,

        #[arg(short, long)]
        seed: Option<u32>,
    },
}

fn main() {
    let cli = Cli::parse();

    let registry = match CardRegistry::load("cards.json") {
        Ok(registry) => {
            eprintln!("✓ loaded {} cards from cards.json", registry.len());
            registry
        }
        Err(e) => {
            eprintln!("✗ failed to load cards: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Command::Run {
            games,
            deck,
            seed,
            verbose,
        }) => run_command(&registry, &deck, games, seed, verbose),
        Some(Command::Compare {
            deck1,
            deck2,
            games,
        }) => compare_command(&registry, &deck1, &deck2, games),
        Some(Command::Optimize {
            configs,
            games,
            strategy,
            deck,
        }) => optimize_command(&registry, configs, games, &strategy, &deck),
        Some(Command::Analyze { games, deck, seed }) => {
            analyze_command(&registry, &deck, games, seed)
        }
        None => {
            let games = if cli.verbose { 1 } else { 1000 };
            run_command(&registry, &cli.deck, games, cli.seed, cli.verbose);
        }
    }
}

fn load_deck(registry: &CardRegistry, path: &str) -> Vec<Card> {
    match parse_deck_file(path, registry) {
        Ok(deck) => deck,
        Err(e) => {
            eprintln!("✗ failed to parse deck '{path}': {e}");
            std::process::exit(1);
        }
    }
}

fn run_batch(deck: &[Card], games: usize, seed: Option<u32>, verbose: bool) -> Vec<GameResult> {
    match seed {
        Some(base) => {
            if verbose {
                (0..games)
                    .map(|i| run_game(deck, base.wrapping_add(i as u32), i == 0))
                    .collect()
            } else {
                (0..games)
                    .into_par_iter()
                    .map(|i| run_game(deck, base.wrapping_add(i as u32), false))
                    .collect()
            }
        }
        None => {
            if verbose {
                let base: u32 = rand::thread_rng().gen();
                println!("Seed: {base}");
                (0..games)
                    .map(|i| run_game(deck, base.wrapping_add(i as u32), i == 0))
                    .collect()
            } else {
                (0..games)
                    .into_par_iter()
                    .map_init(rand::thread_rng, |rng, _| run_game(deck, rng.gen(), false))
                    .collect()
            }
        }
    }
}

fn run_command(registry: &CardRegistry, deck_file: &str, games: usize, seed: Option<u32>, verbose: bool) {
    let deck = load_deck(registry, deck_file);

    println!("\n=== gravetide ===\n");
    println!("Deck: {deck_file} ({} cards)", deck.len());
    println!("Games: {games}");
    if let Some(s) = seed {
        println!("Seed: {s}");
    }
    println!();

    let start = std::time::Instant::now();
    let results = run_batch(&deck, games, seed, verbose);
    let elapsed = start.elapsed();

    let summary = stats::summarize(&results);
    println!("=== Results ===\n");
    println!(
        "Win rate: {:.1}% ({}/{})",
        summary.win_rate() * 100.0,
        summary.wins,
        summary.games
    );
    println!("Average win turn: {:.2}", summary.average_win_turn);
    println!("Average UBG-available turn: {:.2}", summary.average_ubg_turn);
    println!("\nWin-turn distribution:");
    print!("{}", stats::render_histogram(&summary));
    println!(
        "\nFinished in {:.2?} ({:.0} games/sec)",
        elapsed,
        games as f64 / elapsed.as_secs_f64()
    );
}

fn compare_command(registry: &CardRegistry, deck1_file: &str, deck2_file: &str, games: usize) {
    let deck1 = load_deck(registry, deck1_file);
    let deck2 = load_deck(registry, deck2_file);

    println!("\n=== Deck comparison ===\n");
    println!("Deck 1: {deck1_file}");
    println!("Deck 2: {deck2_file}");
    println!("Games per deck: {games}\n");

    let start = std::time::Instant::now();
    let first = stats::summarize(&run_batch(&deck1, games, None, false));
    let second = stats::summarize(&run_batch(&deck2, games, None, false));
    let elapsed = start.elapsed();

    println!("{:<20} {:>14} {:>14}", "Metric", deck1_file, deck2_file);
    println!("{:-<50}", "");
    println!(
        "{:<20} {:>13.1}% {:>13.1}%",
        "Win rate",
        first.win_rate() * 100.0,
        second.win_rate() * 100.0
    );
    println!(
        "{:<20} {:>14.2} {:>14.2}",
        "Avg win turn", first.average_win_turn, second.average_win_turn
    );

    println!();
    if first.win_rate() > second.win_rate() {
        println!(
            "✓ {deck1_file} wins {:.1}% more often",
            (first.win_rate() - second.win_rate()) * 100.0
        );
    } else if second.win_rate() > first.win_rate() {
        println!(
            "✓ {deck2_file} wins {:.1}% more often",
            (second.win_rate() - first.win_rate()) * 100.0
        );
    } else {
        println!("Both decks win at the same rate");
    }
    println!("\nFinished in {elapsed:.2?}");
}

fn optimize_command(
    registry: &CardRegistry,
    configs: usize,
    games: usize,
    strategy: &str,
    deck_file: &str,
) {
    if !matches!(strategy, "weighted" | "shuffle") {
        eprintln!("✗ unknown strategy '{strategy}', expected 'weighted' or 'shuffle'");
        std::process::exit(1);
    }

    let base_deck = load_deck(registry, deck_file);
    let spells = spell_counts(&base_deck);
    let spell_total: usize = spells.iter().map(|(_, n)| n).sum();

    println!("\n=== Land optimization ===\n");
    println!("Base deck: {deck_file} ({spell_total} fixed spells)");
    println!("Strategy: {strategy}");
    println!("Sampling {configs} configurations x {games} games\n");

    let bar = ProgressBar::new(configs as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} (eta {eta})")
            .expect("static progress template"),
    );

    let mut seeder = rand::thread_rng();
    let mut best: Option<(optimize::LandConfig, stats::BatchStats)> = None;
    let mut leaderboard: Vec<(optimize::LandConfig, f64, f64)> = Vec::new();

    let start = std::time::Instant::now();
    for _ in 0..configs {
        let mut config_rng = SimRng::new(seeder.gen());
        let config = match strategy {
            "shuffle" => optimize::random_config_shuffle(&mut config_rng),
            _ => optimize::random_config_weighted(&mut config_rng),
        };

        let deck = match optimize::build_deck(&config, &spells, registry) {
            Ok(deck) => deck,
            Err(e) => {
                bar.println(format!("skipping configuration: {e}"));
                bar.inc(1);
                continue;
            }
        };

        let summary = stats::summarize(&run_batch(&deck, games, None, false));
        let avg = if summary.wins > 0 {
            summary.average_win_turn
        } else {
            f64::INFINITY
        };
        leaderboard.push((config.clone(), summary.win_rate(), avg));

        let improved = match &best {
            Some((_, incumbent)) => {
                summary.wins > 0 && summary.average_win_turn < incumbent.average_win_turn
            }
            None => summary.wins > 0,
        };
        if improved {
            bar.println(format!(
                "new best: avg turn {:.3}, win rate {:.1}% — {}",
                summary.average_win_turn,
                summary.win_rate() * 100.0,
                optimize::config_line(&config)
            ));
            best = Some((config, summary));
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    let elapsed = start.elapsed();
    println!("\n=== Optimization done ===");
    println!("Total games: {}", configs * games);
    println!("Elapsed: {elapsed:.2?}\n");

    leaderboard.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));
    println!("Top configurations:");
    for (i, (config, win_rate, avg)) in leaderboard.iter().take(10).enumerate() {
        println!(
            "[{:2}] avg turn {:.3}, win rate {:.1}%",
            i + 1,
            avg,
            win_rate * 100.0
        );
        println!("     {}", optimize::config_line(config));
    }

    if let Some((config, summary)) = &best {
        println!("\nBest mana base:");
        println!("{}", optimize::config_line(config));
        let params = SaveParams {
            win_rate: summary.win_rate(),
            average_win_turn: summary.average_win_turn,
            games_per_config: games,
            strategy,
            win_turns: &summary.win_turns,
            spells: &spells,
        };
        match optimize::save_deck(config, &params) {
            Ok(path) => println!("Saved to {path}"),
            Err(e) => eprintln!("✗ could not save deck: {e}"),
        }
    }
}

fn analyze_command(registry: &CardRegistry, deck_file: &str, games: usize, seed: Option<u32>) {
    let deck = load_deck(registry, deck_file);

    println!("\n=== Turn-4 combo analysis ===\n");
    println!("Deck: {deck_file} ({} cards)", deck.len());
    println!("Games: {games}\n");

    let start = std::time::Instant::now();
    let snapshots: Vec<_> = match seed {
        Some(base) => (0..games)
            .into_par_iter()
            .map(|i| analyze::run_game_to_turn4(&deck, base.wrapping_add(i as u32)))
            .collect(),
        None => (0..games)
            .into_par_iter()
            .map_init(rand::thread_rng, |rng, _| {
                analyze::run_game_to_turn4(&deck, rng.gen())
            })
            .collect(),
    };
    let elapsed = start.elapsed();

    let summary = analyze::aggregate(&snapshots);
    let mut ranked: Vec<_> = summary.failure_counts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1));

    println!("Blockers at the start of turn 4:\n");
    for (reason, count) in ranked {
        let pct = *count as f64 / games as f64 * 100.0;
        let barline = "█".repeat((pct / 2.0) as usize);
        println!("  {:<32} {pct:5.1}% {barline} ({count})", reason.to_string());
    }

    println!("\nAverage mana available: {:.2}", summary.average_mana);
    println!("Color availability:");
    println!("  Blue:  {:5.1}%", summary.color_rates.0);
    println!("  Black: {:5.1}%", summary.color_rates.1);
    println!("  Green: {:5.1}%", summary.color_rates.2);

    let ready = summary
        .failure_counts
        .get(&analyze::FailureReason::ComboAvailable)
        .copied()
        .unwrap_or(0);
    println!(
        "\nCombo ready on turn 4: {:.1}% ({ready}/{games})",
        ready as f64 / games as f64 * 100.0
    );
    println!(
        "Finished in {:.2?} ({:.0} games/sec)",
        elapsed,
        games as f64 / elapsed.as_secs_f64()
    );
}
