use super::types::RandomEvent;

#[derive(Copy, Clone, Debug)]
enum Adjustment {
    Fixed(f64),
    ShareOfIncome(f64),
}

#[derive(Copy, Clone, Debug)]
struct EventTemplate {
    message: &'static str,
    adjustment: Adjustment,
}

const EVENT_TABLE: [EventTemplate; 10] = [
    EventTemplate {
        message: "Your car broke down and needed an unexpected repair.",
        adjustment: Adjustment::Fixed(-150.0),
    },
    EventTemplate {
        message: "A heatwave sent your utility bill through the roof.",
        adjustment: Adjustment::ShareOfIncome(-0.05),
    },
    EventTemplate {
        message: "You had an unplanned trip to the doctor.",
        adjustment: Adjustment::Fixed(-100.0),
    },
    EventTemplate {
        message: "A leaking pipe at home had to be fixed.",
        adjustment: Adjustment::Fixed(-120.0),
    },
    EventTemplate {
        message: "You lost money to an online scam.",
        adjustment: Adjustment::Fixed(-80.0),
    },
    EventTemplate {
        message: "You received a small performance bonus at work!",
        adjustment: Adjustment::Fixed(100.0),
    },
    EventTemplate {
        message: "A store refunded an old purchase.",
        adjustment: Adjustment::Fixed(50.0),
    },
    EventTemplate {
        message: "You found some cash in an old jacket.",
        adjustment: Adjustment::Fixed(75.0),
    },
    EventTemplate {
        message: "A friend paid back money they owed you.",
        adjustment: Adjustment::Fixed(60.0),
    },
    EventTemplate {
        message: "You got a discount on a dinner out.",
        adjustment: Adjustment::Fixed(30.0),
    },
];

/// Picks the event for a round. This is a deterministic function of its
/// inputs; equal `(income + iteration) mod 10` values always collide.
pub fn draw_event(biweekly_income: f64, iteration: u32) -> RandomEvent {
    let template = EVENT_TABLE[event_index(biweekly_income, iteration)];
    let adjustment = match template.adjustment {
        Adjustment::Fixed(amount) => amount,
        Adjustment::ShareOfIncome(share) => biweekly_income * share,
    };
    RandomEvent {
        message: template.message,
        adjustment,
    }
}

fn event_index(biweekly_income: f64, iteration: u32) -> usize {
    let len = EVENT_TABLE.len();
    let raw = (biweekly_income + f64::from(iteration)).rem_euclid(len as f64);
    // NaN and infinities fall through `as` to 0.
    (raw.floor() as usize).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{any, prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn table_has_five_shocks_then_five_windfalls() {
        for (index, _) in EVENT_TABLE.iter().enumerate() {
            let event = draw_event(1000.0 - 1.0 + index as f64, 1);
            if index < 5 {
                assert!(event.adjustment < 0.0, "index {index} should be a shock");
            } else {
                assert!(event.adjustment > 0.0, "index {index} should be a windfall");
            }
        }
    }

    #[test]
    fn index_is_income_plus_iteration_mod_ten() {
        assert_eq!(event_index(1875.0, 1), 6);
        assert_eq!(event_index(1875.0, 2), 7);
        assert_eq!(event_index(1000.0, 10), 0);
    }

    #[test]
    fn fractional_income_is_floored() {
        assert_eq!(event_index(1875.5, 1), 6);
        assert_eq!(event_index(0.99, 0), 0);
    }

    #[test]
    fn utility_spike_scales_with_income() {
        let event = draw_event(2000.0, 1);
        assert_approx(event.adjustment, -100.0);
        let event = draw_event(1000.0, 1);
        assert_approx(event.adjustment, -50.0);
    }

    #[test]
    fn non_finite_income_maps_to_first_event() {
        assert_eq!(event_index(f64::NAN, 3), 0);
        assert_eq!(event_index(f64::INFINITY, 3), 0);
    }

    proptest! {
        #[test]
        fn prop_draw_is_deterministic(income_cents in 0u32..2_000_000, iteration in 1u32..14) {
            let income = f64::from(income_cents) / 100.0;
            let first = draw_event(income, iteration);
            let second = draw_event(income, iteration);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_index_is_in_range(income in any::<f64>(), iteration in any::<u32>()) {
            prop_assert!(event_index(income, iteration) < EVENT_TABLE.len());
        }
    }
}
