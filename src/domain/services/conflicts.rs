use std::collections::HashSet;
use chrono::{DateTime, Utc};
use crate::domain::models::appointment::Appointment;

/// One trainer cannot serve two clients inside the same hour.
pub const CONFLICT_WINDOW_MS: i64 = 60 * 60 * 1000;

/// Appointments strictly closer than one hour to `candidate`, on either side.
///
/// `exclude_id` drops the appointment being edited. `scope` restricts the
/// search to those customer ids; `None` searches everything given.
pub fn find_conflicts<'a>(
    candidate: DateTime<Utc>,
    appointments: &'a [Appointment],
    exclude_id: Option<&str>,
    scope: Option<&HashSet<String>>,
) -> Vec<&'a Appointment> {
    appointments
        .iter()
        .filter(|a| scope.is_none_or(|ids| ids.contains(&a.customer_id)))
        .filter(|a| exclude_id != Some(a.id.as_str()))
        .filter(|a| (a.datetime - candidate).num_milliseconds().abs() < CONFLICT_WINDOW_MS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    fn apt(id: &str, customer: &str, when: DateTime<Utc>) -> Appointment {
        Appointment {
            id: id.into(),
            customer_id: customer.into(),
            datetime: when,
            session_number: 1,
            notes: String::new(),
        }
    }

    fn ids(found: &[&Appointment]) -> Vec<String> {
        found.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn test_both_neighbours_flagged_regardless_of_customer() {
        let existing = vec![apt("a", "c1", at(10, 0)), apt("b", "c2", at(10, 59))];
        let found = find_conflicts(at(10, 30), &existing, None, None);
        assert_eq!(ids(&found), vec!["a", "b"]);
    }

    #[test]
    fn test_exactly_one_hour_is_not_a_conflict() {
        let existing = vec![apt("a", "c1", at(10, 0)), apt("b", "c2", at(10, 59))];

        let after = find_conflicts(at(11, 0), &existing, None, None);
        assert_eq!(ids(&after), vec!["b"]);

        let before = find_conflicts(at(9, 0), &existing, None, None);
        assert!(before.is_empty());
    }

    #[test]
    fn test_edited_appointment_is_excluded() {
        let existing = vec![apt("a", "c1", at(10, 0)), apt("b", "c1", at(10, 20))];
        let found = find_conflicts(at(10, 5), &existing, Some("a"), None);
        assert_eq!(ids(&found), vec!["b"]);
    }

    #[test]
    fn test_scope_hides_other_users_customers() {
        let existing = vec![apt("mine", "c1", at(10, 0)), apt("theirs", "c9", at(10, 0))];
        let scope: HashSet<String> = ["c1".to_string()].into_iter().collect();
        let found = find_conflicts(at(10, 10), &existing, None, Some(&scope));
        assert_eq!(ids(&found), vec!["mine"]);

        let empty = HashSet::new();
        assert!(find_conflicts(at(10, 10), &existing, None, Some(&empty)).is_empty());
    }
}
