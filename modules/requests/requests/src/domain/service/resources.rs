//! Line-item reconciliation: one change record per added, changed or removed
//! line.

use requests_sdk::{ResourceLine, WarehouseLine};
use serde_json::json;
use uuid::Uuid;

use crate::domain::change_tracker::ChangeTracker;
use crate::domain::display;
use crate::domain::document;
use crate::domain::error::DomainError;

/// Lines are keyed by name, so a name may appear only once per list.
pub(super) fn check_unique_names(field: &str, lines: &[ResourceLine]) -> Result<(), DomainError> {
    for (i, line) in lines.iter().enumerate() {
        if lines[..i].iter().any(|l| l.name == line.name) {
            return Err(DomainError::validation(
                field,
                format!("'{}' is listed more than once", line.name),
            ));
        }
    }
    Ok(())
}

/// Diff manually entered lines keyed by name.
pub(super) fn diff_resource_lines(
    (field, display_name): (&str, &str),
    old: &[ResourceLine],
    new: &[ResourceLine],
    tracker: &mut ChangeTracker,
) {
    for line in new {
        let value = document::resource_lines(std::slice::from_ref(line));
        match old.iter().find(|o| o.name == line.name) {
            None => tracker.record(
                field,
                value,
                display_name,
                format!("added {}", display::resource_line(line)),
            ),
            Some(previous) if previous != line => tracker.record(
                field,
                value,
                display_name,
                format!("changed {}", display::resource_line(line)),
            ),
            Some(_) => {}
        }
    }
    for line in old.iter().filter(|o| !new.iter().any(|n| n.name == o.name)) {
        tracker.record(
            field,
            json!({ "removed": line.name }),
            display_name,
            format!("removed {}", line.name),
        );
    }
}

fn warehouse_key(line: &WarehouseLine) -> (Uuid, Uuid) {
    (line.warehouse_id, line.item_id)
}

/// Diff reserved warehouse items keyed by warehouse and item.
pub(super) fn diff_warehouse_lines(
    old: &[WarehouseLine],
    new: &[WarehouseLine],
    tracker: &mut ChangeTracker,
) {
    const FIELD: &str = "execution.warehouses";
    const DISPLAY_NAME: &str = "Warehouse items";

    for line in new {
        let value = document::warehouse_lines(std::slice::from_ref(line));
        match old.iter().find(|o| warehouse_key(o) == warehouse_key(line)) {
            None => tracker.record(
                FIELD,
                value,
                DISPLAY_NAME,
                format!("added {}", display::warehouse_line(line)),
            ),
            Some(previous) if previous.quantity != line.quantity => tracker.record(
                FIELD,
                value,
                DISPLAY_NAME,
                format!("changed {}", display::warehouse_line(line)),
            ),
            Some(_) => {}
        }
    }
    for line in old
        .iter()
        .filter(|o| !new.iter().any(|n| warehouse_key(n) == warehouse_key(o)))
    {
        tracker.record(
            FIELD,
            json!({ "removed": { "warehouse": line.warehouse_id, "item": line.item_id } }),
            DISPLAY_NAME,
            format!("removed {}", line.name),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn material(name: &str, quantity: i64) -> ResourceLine {
        ResourceLine {
            name: name.to_owned(),
            unit: "pcs".to_owned(),
            quantity: Decimal::from(quantity),
            price: Decimal::new(1250, 2),
        }
    }

    #[test]
    fn resource_diff_reports_each_line_once() {
        let old = vec![material("pipe", 1), material("tape", 2), material("valve", 1)];
        let new = vec![material("pipe", 1), material("tape", 3), material("seal", 4)];
        let mut tracker = ChangeTracker::new();

        diff_resource_lines(("execution.materials", "Materials"), &old, &new, &mut tracker);

        let shown: Vec<_> = tracker
            .records()
            .iter()
            .map(|r| r.display_value.as_str())
            .collect();
        assert_eq!(
            shown,
            vec!["changed tape 3 pcs x 12.50", "added seal 4 pcs x 12.50", "removed valve"]
        );
    }

    #[test]
    fn repeated_line_name_is_rejected() {
        assert!(check_unique_names("execution.materials", &[material("pipe", 1)]).is_ok());

        let err = check_unique_names(
            "execution.materials",
            &[material("pipe", 1), material("tape", 1), material("pipe", 2)],
        )
        .unwrap_err();
        assert!(
            matches!(err, DomainError::Validation { ref field, ref message }
                if field == "execution.materials" && message.contains("'pipe'"))
        );
    }

    #[test]
    fn warehouse_diff_keys_by_warehouse_and_item() {
        let warehouse = Uuid::now_v7();
        let item = Uuid::now_v7();
        let line = |q: i64| WarehouseLine {
            warehouse_id: warehouse,
            item_id: item,
            name: "cable".to_owned(),
            quantity: Decimal::from(q),
        };
        let mut tracker = ChangeTracker::new();

        diff_warehouse_lines(&[line(2)], &[line(2)], &mut tracker);
        assert!(tracker.is_empty());

        diff_warehouse_lines(&[line(2)], &[line(5)], &mut tracker);
        diff_warehouse_lines(&[line(5)], &[], &mut tracker);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.records()[1].display_value, "removed cable");
    }
}
