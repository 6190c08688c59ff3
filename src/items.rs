use crate::catalog::Catalog;
use crate::expiry::parse_ymd;
use crate::form::{ExpiryForm, FormFields, check_date_order};
use crate::models::{AppData, Item, ItemQuery, ItemStatus, ItemView, NewItemRequest};
use crate::rules::RuleBook;
use crate::stats::{ExpiryBucket, days_left};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemError {
    #[error("name is required")]
    MissingName,
    #[error("unknown product type '{0}'")]
    UnknownProductType(String),
    #[error("{0} must be a valid YYYY-MM-DD date")]
    InvalidDate(&'static str),
    #[error("expiry must be on or after the opened date")]
    ExpiresBeforeOpened,
    #[error("item {0} not found")]
    NotFound(u64),
    #[error("item {0} is already finished")]
    AlreadyFinished(u64),
}

/// Validates a submitted item form and builds the item.
///
/// The submission is replayed through the expiry form first, so whenever a
/// rule applies the expiry is the derived one regardless of what was sent.
/// The product type is stored as the catalogue id, and `next_id` is only
/// called once the submission is valid.
pub fn build_item(
    request: NewItemRequest,
    catalog: &Catalog,
    rules: Arc<RuleBook>,
    next_id: impl FnOnce() -> u64,
) -> Result<Item, ItemError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ItemError::MissingName);
    }
    let product_type = request.product_type.trim();
    let product_type = catalog
        .get(product_type)
        .map(|entry| entry.id.to_string())
        .ok_or_else(|| ItemError::UnknownProductType(product_type.to_string()))?;

    let fields = FormFields {
        product_type: Some(product_type),
        opened_on: Some(request.opened_on),
        expires_on: Some(request.expires_on.unwrap_or_default()),
    };
    let state = ExpiryForm::attach(rules, fields)
        .map(ExpiryForm::into_state)
        .unwrap_or_default();

    let opened_on = parse_ymd(&state.opened_on).ok_or(ItemError::InvalidDate("opened_on"))?;
    let expires_on = parse_ymd(&state.expires_on).ok_or(ItemError::InvalidDate("expires_on"))?;
    check_date_order(&state).map_err(|_| ItemError::ExpiresBeforeOpened)?;

    Ok(Item {
        id: next_id(),
        product_type: state.product_type,
        name,
        brand: non_empty(request.brand),
        color_code: non_empty(request.color_code),
        opened_on,
        expires_on,
        status: ItemStatus::Using,
        finished_on: None,
        memo: non_empty(request.memo),
        created_at: Local::now(),
    })
}

/// Builds the item and appends it to the store under a fresh id.
pub fn register_item(
    data: &mut AppData,
    request: NewItemRequest,
    catalog: &Catalog,
    rules: Arc<RuleBook>,
) -> Result<Item, ItemError> {
    let item = build_item(request, catalog, rules, || data.allocate_item_id())?;
    data.items.push(item.clone());
    Ok(item)
}

pub fn finish_item(data: &mut AppData, id: u64, today: NaiveDate) -> Result<Item, ItemError> {
    let item = data
        .items
        .iter_mut()
        .find(|item| item.id == id)
        .ok_or(ItemError::NotFound(id))?;
    if item.status == ItemStatus::Finished {
        return Err(ItemError::AlreadyFinished(id));
    }
    item.status = ItemStatus::Finished;
    item.finished_on = Some(today);
    Ok(item.clone())
}

/// Filters and sorts items for the list page.
///
/// `category` is a category path at any depth (`Makeup`, `Makeup > Eye`)
/// and matches the product types below it, case-insensitively.
pub fn list_items(data: &AppData, catalog: &Catalog, query: &ItemQuery, today: NaiveDate) -> Vec<ItemView> {
    let product_type = query
        .product_type
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|wanted| catalog.get(wanted).map_or_else(|| wanted.to_string(), |t| t.id.to_string()));
    let category = query.category.as_deref().map(str::trim).filter(|v| !v.is_empty());

    let mut items: Vec<&Item> = data
        .items
        .iter()
        .filter(|item| product_type.as_ref().is_none_or(|wanted| &item.product_type == wanted))
        .filter(|item| {
            category.is_none_or(|wanted| {
                catalog
                    .get(&item.product_type)
                    .is_some_and(|t| t.in_category(wanted))
            })
        })
        .filter(|item| query.status.is_none_or(|status| item.status == status))
        .collect();

    match query.sort.as_deref().unwrap_or("expires_asc") {
        "expires_desc" => items.sort_by(|a, b| b.expires_on.cmp(&a.expires_on).then(a.id.cmp(&b.id))),
        "newest" => items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))),
        _ => items.sort_by(|a, b| a.expires_on.cmp(&b.expires_on).then(a.id.cmp(&b.id))),
    }

    items
        .into_iter()
        .map(|item| to_view(item, catalog, today))
        .collect()
}

pub fn to_view(item: &Item, catalog: &Catalog, today: NaiveDate) -> ItemView {
    let days_left = days_left(today, item.expires_on);
    ItemView {
        id: item.id,
        product_type: item.product_type.clone(),
        product_path: catalog.get(&item.product_type).map(|t| t.path.clone()),
        name: item.name.clone(),
        brand: item.brand.clone(),
        color_code: item.color_code.clone(),
        opened_on: item.opened_on,
        expires_on: item.expires_on,
        status: item.status,
        finished_on: item.finished_on,
        memo: item.memo.clone(),
        days_left,
        bucket: ExpiryBucket::for_days_left(days_left).as_str().to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(product_type: &str, opened_on: &str, expires_on: Option<&str>) -> NewItemRequest {
        NewItemRequest {
            product_type: product_type.to_string(),
            name: "Volume Mascara".to_string(),
            brand: Some("  ".to_string()),
            color_code: None,
            opened_on: opened_on.to_string(),
            expires_on: expires_on.map(str::to_string),
            memo: Some("gift".to_string()),
        }
    }

    fn catalog() -> (Catalog, Arc<RuleBook>) {
        let catalog = Catalog::builtin();
        let rules = Arc::new(catalog.rule_book());
        (catalog, rules)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn derived_expiry_overrides_submitted_value() {
        let (catalog, rules) = catalog();
        let item = build_item(request("113", "2024-11-30", Some("2030-01-01")), &catalog, rules, || 1)
            .unwrap();
        assert_eq!(item.opened_on, ymd(2024, 11, 30));
        assert_eq!(item.expires_on, ymd(2025, 2, 28));
        assert_eq!(item.brand, None);
        assert_eq!(item.memo.as_deref(), Some("gift"));
    }

    #[test]
    fn padded_product_type_is_stored_canonically_with_derived_expiry() {
        let (catalog, rules) = catalog();
        for spelling in ["0113", "+113", " 113 "] {
            let item = build_item(
                request(spelling, "2024-01-31", Some("2099-12-31")),
                &catalog,
                Arc::clone(&rules),
                || 1,
            )
            .unwrap();
            assert_eq!(item.product_type, "113", "spelling {spelling:?}");
            assert_eq!(item.expires_on, ymd(2024, 4, 30), "spelling {spelling:?}");
        }

        let mut data = AppData::default();
        register_item(&mut data, request("0113", "2024-01-31", None), &catalog, rules).unwrap();
        let query = ItemQuery {
            product_type: Some("113".to_string()),
            ..ItemQuery::default()
        };
        assert_eq!(list_items(&data, &catalog, &query, ymd(2024, 2, 1)).len(), 1);
    }

    #[test]
    fn rejects_bad_submissions() {
        let (catalog, rules) = catalog();
        let mut nameless = request("113", "2024-01-01", None);
        nameless.name = " ".to_string();
        assert_eq!(
            build_item(nameless, &catalog, Arc::clone(&rules), || 1).unwrap_err(),
            ItemError::MissingName
        );
        assert_eq!(
            build_item(request("999", "2024-01-01", None), &catalog, Arc::clone(&rules), || 1)
                .unwrap_err(),
            ItemError::UnknownProductType("999".to_string())
        );
        assert_eq!(
            build_item(request("113", "2024-02-30", Some("2024-05-01")), &catalog, rules, || 1)
                .unwrap_err(),
            ItemError::InvalidDate("opened_on")
        );
    }

    #[test]
    fn rejected_submissions_do_not_consume_ids() {
        let (catalog, rules) = catalog();
        let mut data = AppData::default();
        let rejected = [
            request("999", "2024-01-01", None),
            request("113", "2024-02-30", None),
            request("113", "", Some("2024-05-01")),
        ];
        for bad in rejected {
            assert!(register_item(&mut data, bad, &catalog, Arc::clone(&rules)).is_err());
        }
        assert!(data.items.is_empty());
        assert_eq!(data.next_item_id, 0);

        let item = register_item(&mut data, request("113", "2024-01-01", None), &catalog, rules).unwrap();
        assert_eq!(item.id, 1);
        assert_eq!(data.items.len(), 1);
    }

    #[test]
    fn submitted_expiry_used_when_no_rule_applies() {
        let catalog = Catalog::builtin();
        let empty_rules = Arc::new(RuleBook::new());
        let item = build_item(
            request("113", "2024-01-10", Some("2024-03-01")),
            &catalog,
            Arc::clone(&empty_rules),
            || 7,
        )
        .unwrap();
        assert_eq!(item.expires_on, ymd(2024, 3, 1));
        assert_eq!(item.id, 7);

        let err = build_item(request("113", "2024-01-10", Some("2023-12-31")), &catalog, empty_rules, || 8)
            .unwrap_err();
        assert_eq!(err, ItemError::ExpiresBeforeOpened);
    }

    #[test]
    fn list_filters_and_sorts() {
        let (catalog, rules) = catalog();
        let mut data = AppData::default();
        for (product_type, opened_on) in [("113", "2024-01-10"), ("401", "2024-01-10"), ("211", "2024-01-10")] {
            register_item(&mut data, request(product_type, opened_on, None), &catalog, Arc::clone(&rules))
                .unwrap();
        }
        let today = ymd(2024, 3, 1);

        let all = list_items(&data, &catalog, &ItemQuery::default(), today);
        let order: Vec<&str> = all.iter().map(|v| v.product_type.as_str()).collect();
        assert_eq!(order, vec!["113", "211", "401"]);
        assert_eq!(all[0].days_left, 40);
        assert_eq!(all[0].bucket, "safe");

        let makeup = ItemQuery {
            category: Some("makeup".to_string()),
            ..ItemQuery::default()
        };
        let filtered = list_items(&data, &catalog, &makeup, today);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].product_path.as_deref(), Some("Makeup > Eye > Mascara"));

        finish_item(&mut data, 2, today).unwrap();
        assert_eq!(finish_item(&mut data, 2, today).unwrap_err(), ItemError::AlreadyFinished(2));
        assert_eq!(finish_item(&mut data, 42, today).unwrap_err(), ItemError::NotFound(42));

        let using = ItemQuery {
            status: Some(ItemStatus::Using),
            sort: Some("expires_desc".to_string()),
            ..ItemQuery::default()
        };
        let order: Vec<u64> = list_items(&data, &catalog, &using, today).iter().map(|v| v.id).collect();
        assert_eq!(order, vec![3, 1]);
    }

    #[test]
    fn category_filter_matches_any_level_of_the_path() {
        let (catalog, rules) = catalog();
        let mut data = AppData::default();
        for product_type in ["113", "111", "121", "211"] {
            register_item(&mut data, request(product_type, "2024-01-10", None), &catalog, Arc::clone(&rules))
                .unwrap();
        }
        let today = ymd(2024, 3, 1);
        let in_category = |category: &str| {
            let query = ItemQuery {
                category: Some(category.to_string()),
                ..ItemQuery::default()
            };
            let mut types: Vec<String> = list_items(&data, &catalog, &query, today)
                .into_iter()
                .map(|v| v.product_type)
                .collect();
            types.sort();
            types
        };

        assert_eq!(in_category("Makeup"), vec!["111", "113", "121"]);
        assert_eq!(in_category("makeup > eye"), vec!["111", "113"]);
        assert_eq!(in_category("Makeup>Eye>Mascara"), vec!["113"]);
        assert!(in_category("Make").is_empty());
        assert!(in_category("Makeup > Ey").is_empty());
        assert!(in_category("Eye").is_empty());
    }
}
