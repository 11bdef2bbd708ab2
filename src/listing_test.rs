use super::*;
use crate::api::{applications, credentials, users};
use serde_json::json;

fn app(name: &str, active: bool) -> Application {
    applications::normalize(&json!({ "app_name": name, "is_active": active })).unwrap()
}

fn user(first: &str, email: &str, app_name: &str) -> AppUser {
    users::normalize(&json!({
        "first_name": first,
        "last_name": "Doe",
        "login_id": first.to_lowercase(),
        "email_id": email,
        "app_name": app_name
    }))
    .unwrap()
}

fn cred(id: &str, active: bool) -> AzureCredential {
    credentials::normalize(&json!({ "cred_id": id, "is_active": active })).unwrap()
}

// =============================================================================
// StatusFilter
// =============================================================================

#[test]
fn status_parses_case_insensitively() {
    assert_eq!("ACTIVE".parse::<StatusFilter>().unwrap(), StatusFilter::Active);
    assert_eq!("inactive".parse::<StatusFilter>().unwrap(), StatusFilter::Inactive);
    assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);
    assert!("paused".parse::<StatusFilter>().is_err());
}

#[test]
fn status_admits() {
    assert!(StatusFilter::All.admits(false));
    assert!(StatusFilter::Active.admits(true));
    assert!(!StatusFilter::Active.admits(false));
    assert!(StatusFilter::Inactive.admits(false));
}

// =============================================================================
// paginate
// =============================================================================

#[test]
fn first_page_bounds() {
    let items: Vec<u32> = (1..=12).collect();
    let page = paginate(&items, 1, 5);
    assert_eq!(page.items, vec![1, 2, 3, 4, 5]);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.showing(), "Showing 1 - 5 of 12");
    assert!(page.has_next());
    assert!(!page.has_previous());
}

#[test]
fn last_partial_page_bounds() {
    let items: Vec<u32> = (1..=12).collect();
    let page = paginate(&items, 3, 5);
    assert_eq!(page.items, vec![11, 12]);
    assert_eq!(page.showing(), "Showing 11 - 12 of 12");
    assert!(!page.has_next());
    assert!(page.has_previous());
}

#[test]
fn exact_multiple_has_no_extra_page() {
    let items: Vec<u32> = (1..=10).collect();
    assert_eq!(paginate(&items, 1, 5).total_pages, 2);
}

#[test]
fn page_past_end_is_empty() {
    let items: Vec<u32> = (1..=3).collect();
    let page = paginate(&items, 4, 5);
    assert!(page.items.is_empty());
    assert_eq!(page.total_items, 3);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.showing(), "Showing 0 - 0 of 3");
}

#[test]
fn zero_page_and_size_clamp_to_one() {
    let items = vec!['a', 'b', 'c'];
    let page = paginate(&items, 0, 0);
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, 1);
    assert_eq!(page.items, vec!['a']);
    assert_eq!(page.total_pages, 3);
}

#[test]
fn empty_list() {
    let page = paginate::<u8>(&[], 1, DEFAULT_PAGE_SIZE);
    assert_eq!(page.total_pages, 0);
    assert_eq!(page.showing(), "Showing 0 - 0 of 0");
    assert!(!page.has_next());
    assert!(!page.has_previous());
}

// =============================================================================
// filters
// =============================================================================

#[test]
fn application_filter_by_name_and_status() {
    let apps = vec![app("Payroll", true), app("Payroll Legacy", false), app("Intranet", true)];
    let filter = ApplicationFilter { name: "payroll".into(), status: StatusFilter::All };
    assert_eq!(filter.apply(&apps).len(), 2);

    let filter = ApplicationFilter { name: "PAY".into(), status: StatusFilter::Inactive };
    let hits = filter.apply(&apps);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].app_name, "Payroll Legacy");
}

#[test]
fn user_filter_searches_every_text_field() {
    let users = vec![
        user("Ada", "ada@example.com", "Payroll"),
        user("Grace", "grace@navy.mil", "Intranet"),
    ];
    let by_email = UserFilter { search: "NAVY".into(), app_name: None };
    assert_eq!(by_email.apply(&users)[0].first_name, "Grace");

    let by_login = UserFilter { search: "ada".into(), app_name: None };
    assert_eq!(by_login.apply(&users).len(), 1);

    let everyone = UserFilter { search: "doe".into(), app_name: None };
    assert_eq!(everyone.apply(&users).len(), 2);
}

#[test]
fn user_filter_app_name_is_exact() {
    let users = vec![user("Ada", "a@x.io", "Payroll"), user("Bob", "b@x.io", "Payroll Legacy")];
    let filter = UserFilter { search: String::new(), app_name: Some("payroll".into()) };
    let hits = filter.apply(&users);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].first_name, "Ada");

    let blank = UserFilter { search: String::new(), app_name: Some("  ".into()) };
    assert_eq!(blank.apply(&users).len(), 2);
}

#[test]
fn credential_filter_by_id_and_status() {
    let creds = vec![cred("CRED001", true), cred("CRED002", false), cred("OTHER", true)];
    let filter = CredentialFilter { cred_id: "cred".into(), status: StatusFilter::Active };
    let hits = filter.apply(&creds);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].cred_id, "CRED001");
}

// =============================================================================
// ListState
// =============================================================================

#[test]
fn changing_filter_resets_to_first_page() {
    let apps: Vec<Application> = (0..12).map(|i| app(&format!("App {i}"), i % 2 == 0)).collect();
    let mut state = ListState::<ApplicationFilter>::default();
    state.set_page(3);
    assert_eq!(state.view(&apps).showing(), "Showing 11 - 12 of 12");

    state.update_filter(|f| f.status = StatusFilter::Active);
    assert_eq!(state.page(), 1);
    let page = state.view(&apps);
    assert_eq!(page.total_items, 6);
    assert_eq!(page.showing(), "Showing 1 - 5 of 6");

    state.set_page(2);
    state.set_filter(ApplicationFilter { name: "App 1".into(), status: StatusFilter::All });
    assert_eq!(state.page(), 1);
    assert_eq!(state.filter().name, "App 1");
}

#[test]
fn list_state_page_size() {
    let items: Vec<Application> = (0..4).map(|i| app(&format!("A{i}"), true)).collect();
    let state = ListState::new(ApplicationFilter::default()).with_per_page(3);
    let page = state.view(&items);
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total_pages, 2);
}
