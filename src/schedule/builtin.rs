use super::{IntervalSpec, ScheduleFile};

const RECORDING_SECONDS: f64 = 270.0;

const TOPICS: [&str; 13] = [
    "Comey",
    "Special Counsel",
    "Collusion",
    "Russia",
    "His Accomplishments",
    "CNN",
    "Democrats",
    "Double Standard",
    "Justice Department",
    "Witch Hunt",
    "FBI",
    "Paul Manafort",
    "Cohen",
];

const INTERVALS: [IntervalSpec; 31] = [
    IntervalSpec::new(0.0, 6.0, 0),
    IntervalSpec::new(6.0, 10.0, 1),
    IntervalSpec::new(10.0, 15.0, 2),
    IntervalSpec::new(15.0, 22.0, 3),
    IntervalSpec::new(22.0, 42.0, 4),
    IntervalSpec::new(42.0, 43.0, 2),
    IntervalSpec::new(43.0, 51.0, 0),
    IntervalSpec::new(51.0, 52.0, 1),
    IntervalSpec::new(52.0, 70.0, 0),
    IntervalSpec::new(70.0, 99.0, 3),
    IntervalSpec::new(99.0, 101.0, 5),
    IntervalSpec::new(101.0, 105.0, 6),
    IntervalSpec::new(105.0, 119.0, 7),
    IntervalSpec::new(119.0, 130.0, 5),
    IntervalSpec::new(130.0, 134.0, 0),
    IntervalSpec::new(134.0, 138.0, 5),
    IntervalSpec::new(138.0, 142.0, 0),
    IntervalSpec::new(142.0, 158.0, 8),
    IntervalSpec::new(158.0, 160.0, 9),
    IntervalSpec::new(160.0, 163.0, 8),
    IntervalSpec::new(163.0, 167.0, 9),
    IntervalSpec::new(167.0, 183.0, 8),
    IntervalSpec::new(183.0, 213.0, 4),
    IntervalSpec::new(213.0, 230.0, 8),
    IntervalSpec::new(230.0, 232.0, 2),
    IntervalSpec::new(232.0, 242.0, 6),
    IntervalSpec::new(242.0, 246.0, 10),
    IntervalSpec::new(246.0, 255.0, 11),
    IntervalSpec::new(255.0, 260.0, 12),
    IntervalSpec::new(260.0, 265.0, 6),
    IntervalSpec::new(265.0, 267.0, 10),
];

/// The press-conference answer the player ships with: 13 topics over a
/// 270 second recording.
pub fn press_conference() -> ScheduleFile {
    ScheduleFile {
        topics: TOPICS.iter().map(|name| (*name).to_string()).collect(),
        intervals: INTERVALS.to_vec(),
        recording_seconds: Some(RECORDING_SECONDS),
    }
}
