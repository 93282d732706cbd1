//! Money helpers

/// Round an amount to 2 decimal places (half away from zero).
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round_money(10.006), 10.01);
        assert_eq!(round_money(10.004), 10.0);
        assert_eq!(round_money(-2.346), -2.35);
        assert_eq!(round_money(0.0), 0.0);
    }
}
