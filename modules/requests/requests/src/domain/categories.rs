//! Fixed category tree: category -> subcategory -> work area -> actions.

use requests_sdk::CategorySelection;

use super::error::DomainError;

pub struct WorkArea {
    pub key: &'static str,
    pub title: &'static str,
    pub actions: &'static [&'static str],
}

pub struct Subcategory {
    pub key: &'static str,
    pub title: &'static str,
    pub work_areas: &'static [WorkArea],
}

pub struct Category {
    pub key: &'static str,
    pub title: &'static str,
    pub subcategories: &'static [Subcategory],
}

pub static CATEGORIES: &[Category] = &[
    Category {
        key: "plumbing",
        title: "Plumbing",
        subcategories: &[
            Subcategory {
                key: "leak",
                title: "Leak",
                work_areas: &[
                    WorkArea {
                        key: "riser",
                        title: "Riser",
                        actions: &["inspect", "replace"],
                    },
                    WorkArea {
                        key: "apartment_pipes",
                        title: "Apartment pipes",
                        actions: &["inspect", "seal"],
                    },
                ],
            },
            Subcategory {
                key: "clog",
                title: "Clog",
                work_areas: &[WorkArea {
                    key: "sewer",
                    title: "Sewer",
                    actions: &["clean"],
                }],
            },
        ],
    },
    Category {
        key: "electrical",
        title: "Electrical",
        subcategories: &[Subcategory {
            key: "outage",
            title: "Outage",
            work_areas: &[
                WorkArea {
                    key: "stairwell",
                    title: "Stairwell",
                    actions: &["replace_lamp", "repair_wiring"],
                },
                WorkArea {
                    key: "apartment",
                    title: "Apartment",
                    actions: &["inspect"],
                },
            ],
        }],
    },
    Category {
        key: "improvement",
        title: "Improvement",
        subcategories: &[Subcategory {
            key: "cleaning",
            title: "Cleaning",
            work_areas: &[WorkArea {
                key: "yard",
                title: "Yard",
                actions: &["clean", "remove_snow"],
            }],
        }],
    },
];

/// Check that `selection` is a path in the tree and return its titles joined
/// with ` / `, for use as a history display value.
///
/// # Errors
/// Fails with a validation error on the first level that is not in the tree.
pub fn validate_selection(selection: &CategorySelection) -> Result<String, DomainError> {
    let category = CATEGORIES
        .iter()
        .find(|c| c.key == selection.category)
        .ok_or_else(|| {
            DomainError::validation(
                "category",
                format!("unknown category '{}'", selection.category),
            )
        })?;
    let mut titles = vec![category.title];

    let Some(sub_key) = selection.subcategory.as_deref() else {
        if selection.work_area.is_some() || !selection.actions.is_empty() {
            return Err(DomainError::validation(
                "subcategory",
                "work area and actions require a subcategory",
            ));
        }
        return Ok(titles.join(" / "));
    };
    let subcategory = category
        .subcategories
        .iter()
        .find(|s| s.key == sub_key)
        .ok_or_else(|| {
            DomainError::validation(
                "subcategory",
                format!("'{sub_key}' is not a subcategory of '{}'", category.key),
            )
        })?;
    titles.push(subcategory.title);

    let Some(area_key) = selection.work_area.as_deref() else {
        if !selection.actions.is_empty() {
            return Err(DomainError::validation(
                "work_area",
                "actions require a work area",
            ));
        }
        return Ok(titles.join(" / "));
    };
    let work_area = subcategory
        .work_areas
        .iter()
        .find(|w| w.key == area_key)
        .ok_or_else(|| {
            DomainError::validation(
                "work_area",
                format!(
                    "'{area_key}' is not a work area of '{}'",
                    subcategory.key
                ),
            )
        })?;
    titles.push(work_area.title);

    if let Some(action) = selection
        .actions
        .iter()
        .find(|a| !work_area.actions.contains(&a.as_str()))
    {
        return Err(DomainError::validation(
            "actions",
            format!("'{action}' is not allowed for '{}'", work_area.key),
        ));
    }

    let mut label = titles.join(" / ");
    if !selection.actions.is_empty() {
        label.push_str(": ");
        label.push_str(&selection.actions.join(", "));
    }
    Ok(label)
}
