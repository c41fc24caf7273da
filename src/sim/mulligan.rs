use crate::card::{names, Card};
use crate::rng::SimRng;
use crate::sim::decisions;

fn count_lands(hand: &[Card]) -> usize {
    hand.iter().filter(|c| c.is_land()).count()
}

fn playable_early(card: &Card) -> bool {
    !card.is_land() && card.mana_value() <= 3
}

/// Ship-it check for a drawn hand. Small hands keep on lands alone; full
/// hands need a reasonable land count plus something to do early.
pub fn should_mulligan(hand: &[Card]) -> bool {
    let lands = count_lands(hand);

    if hand.len() <= 4 {
        return lands < 2;
    }
    if hand.iter().any(decisions::is_mill_enabler) {
        return lands < 2;
    }

    let has_early_play = hand.iter().any(playable_early);
    if (2..=5).contains(&lands) && has_early_play {
        return false;
    }
    lands < 2 || !has_early_play
}

/// Scry after a mulligan: look at the top `count` cards and bottom the ones
/// the hand does not want, keeping the rest on top in their original order.
fn scry_bottom(library: &mut Vec<Card>, hand: &[Card], count: usize) {
    let looking_at = count.min(library.len());
    if looking_at == 0 {
        return;
    }

    let hand_lands = count_lands(hand);
    let looked: Vec<Card> = library.drain(..looking_at).collect();
    let mut kept: Vec<Card> = Vec::new();
    let mut bottomed: Vec<Card> = Vec::new();

    for card in looked {
        let bottom = matches!(card.name(), names::BRINGER | names::TERROR)
            || (card.is_land() && hand_lands >= 3)
            || (card.mana_value() >= 4 && hand_lands < 2);
        if bottom {
            bottomed.push(card);
        } else {
            kept.push(card);
        }
    }

    let mut rebuilt = kept;
    rebuilt.append(library);
    rebuilt.extend(bottomed);
    *library = rebuilt;
}

/// Draw a mulligan hand of `size` cards, retrying smaller as long as the
/// hand is unkeepable. An explicit loop: the size strictly decreases and
/// hands of four or fewer are always taken.
fn draw_mulligan_hand(library: &mut Vec<Card>, size: usize, rng: &mut SimRng) -> Vec<Card> {
    let mut size = size.max(1);
    loop {
        let hand: Vec<Card> = library.drain(..size.min(library.len())).collect();
        if count_lands(&hand) < 2 && size > 4 {
            library.extend(hand);
            rng.shuffle(library);
            size -= 1;
            continue;
        }

        let scry = 7usize.saturating_sub(size);
        if scry > 0 {
            scry_bottom(library, &hand, scry);
        }
        return hand;
    }
}

/// Opening-hand selection: draw two sevens, keep the more land-lean of the
/// keepable ones, then run the mulligan loop on what remains.
pub fn resolve_mulligans(library: &mut Vec<Card>, rng: &mut SimRng) -> Vec<Card> {
    let first: Vec<Card> = library.drain(..7).collect();
    let second: Vec<Card> = library.drain(..7).collect();
    let (lands_first, lands_second) = (count_lands(&first), count_lands(&second));

    let (mut hand, rejected) = match (lands_first >= 2, lands_second >= 2) {
        (true, true) => {
            if lands_first < lands_second {
                (first, second)
            } else if lands_second < lands_first {
                (second, first)
            } else if rng.next_f64() < 0.5 {
                (first, second)
            } else {
                (second, first)
            }
        }
        (true, false) => (first, second),
        (false, true) => (second, first),
        (false, false) => {
            library.extend(first);
            library.extend(second);
            rng.shuffle(library);
            return draw_mulligan_hand(library, 6, rng);
        }
    };

    library.extend(rejected);
    rng.shuffle(library);

    while should_mulligan(&hand) && hand.len() > 4 {
        let smaller = hand.len() - 1;
        library.extend(hand.drain(..));
        rng.shuffle(library);
        hand = draw_mulligan_hand(library, smaller, rng);
    }

    hand
}
