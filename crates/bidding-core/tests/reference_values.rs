use bidding_core::{BidLevel, CardSequence, Evaluator, GameState, Move};

fn state(money: u32, cards: &[u32], bid: BidLevel) -> GameState {
    GameState::new(money, money, CardSequence::new(cards.to_vec()), bid)
}

const DESCENDING: [u32; 5] = [5, 4, 3, 2, 1];
const SHUFFLED: [u32; 5] = [5, 2, 4, 3, 1];
const TEN_LEADS: [u32; 10] = [10, 1, 2, 3, 4, 5, 6, 7, 8, 9];

#[test]
fn five_card_openings_split_eight_to_seven() {
    let mut evaluator = Evaluator::new();
    assert_eq!(evaluator.evaluate(&state(8, &DESCENDING, BidLevel::Open)), Ok(8));
    assert_eq!(evaluator.evaluate(&state(8, &SHUFFLED, BidLevel::Open)), Ok(8));
}

#[test]
fn five_card_standing_bids() {
    let mut evaluator = Evaluator::new();
    let cases = [
        (DESCENDING, 5, 7),
        (DESCENDING, 6, 9),
        (SHUFFLED, 4, 7),
    ];
    for (cards, bid, expected) in cases {
        let value = evaluator
            .evaluate(&state(8, &cards, BidLevel::Standing(bid)))
            .expect("valid state");
        assert_eq!(value, expected, "cards {cards:?} bid {bid}");
    }
}

#[test]
fn ten_card_sequence_led_by_ten() {
    let mut evaluator = Evaluator::new();
    let cases = [
        (BidLevel::Open, 28),
        (BidLevel::Standing(7), 28),
        (BidLevel::Standing(8), 27),
        (BidLevel::Standing(9), 28),
        (BidLevel::Standing(10), 29),
    ];
    for (bid, expected) in cases {
        let value = evaluator
            .evaluate(&state(28, &TEN_LEADS, bid))
            .expect("valid state");
        assert_eq!(value, expected, "bid {bid}");
    }
}

#[test]
fn raw_bid_encoding_gives_same_values() {
    let mut evaluator = Evaluator::new();
    let open = GameState::from_raw(8, 8, DESCENDING, -1).unwrap();
    let five = GameState::from_raw(8, 8, DESCENDING, 5).unwrap();
    assert_eq!(evaluator.evaluate(&open), Ok(8));
    assert_eq!(evaluator.evaluate(&five), Ok(7));
}

#[test]
fn descending_line_opens_with_a_bid_of_five() {
    let mut evaluator = Evaluator::new();
    let start = state(8, &DESCENDING, BidLevel::Open);
    let line = evaluator.optimal_line(&start).unwrap();

    assert_eq!(line.steps()[0].action, Some(Move::Raise(5)));
    assert_eq!(line.steps()[1].action, Some(Move::Forfeit));
    assert_eq!(
        line.steps()[2].state,
        GameState::new(3, 8, [4, 3, 2, 1], BidLevel::Open)
    );
    assert_eq!(line.moves(), 13);
    assert_eq!(line.tally(), (8, 7));
    assert_eq!(
        line.steps().last().map(|step| step.state.clone()),
        Some(GameState::new(4, 0, CardSequence::empty(), BidLevel::Open))
    );
}

#[test]
fn shuffled_line_opens_with_a_bid_of_four() {
    let mut evaluator = Evaluator::new();
    let start = state(8, &SHUFFLED, BidLevel::Open);
    let line = evaluator.optimal_line(&start).unwrap();

    assert_eq!(line.steps()[0].action, Some(Move::Raise(4)));
    assert_eq!(line.moves(), 17);
    assert_eq!(line.tally(), (8, 7));
    for step in line.steps() {
        let expected = evaluator.evaluate(&step.state).unwrap();
        assert_eq!(step.value, expected);
    }
}

#[test]
fn ten_card_line_tallies_to_value() {
    let mut evaluator = Evaluator::new();
    let start = state(28, &TEN_LEADS, BidLevel::Open);
    let line = evaluator.optimal_line(&start).unwrap();
    assert_eq!(line.tally(), (28, 27));
}
