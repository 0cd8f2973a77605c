//! Human-readable reference codes for customer-facing records.

use uuid::Uuid;

fn short_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_uppercase()
}

pub fn booking_code() -> String {
    format!("BK-{}", short_id())
}

pub fn order_code() -> String {
    format!("ORD-{}", short_id())
}

pub fn quote_code() -> String {
    format!("QT-{}", short_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_carry_expected_prefix_and_length() {
        assert!(booking_code().starts_with("BK-"));
        assert!(order_code().starts_with("ORD-"));
        assert!(quote_code().starts_with("QT-"));
        assert_eq!(booking_code().len(), 3 + 8);
    }

    #[test]
    fn codes_are_unique_enough() {
        let a = order_code();
        let b = order_code();
        assert_ne!(a, b);
    }
}
