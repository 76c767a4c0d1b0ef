//! Example inputs for trying the pipeline without writing a story

pub const STORIES: &[(&str, &str)] = &[
    (
        "login",
        "As a registered user, I want to log in with my email and password \
         so that I can access my dashboard. Invalid credentials should show an \
         error message and the account should lock after 5 failed attempts.",
    ),
    (
        "signup",
        "As a new visitor, I want to create an account with my name, email and a \
         password of at least 8 characters so that I can save my preferences.",
    ),
    (
        "search",
        "As a shopper, I want to search products by keyword so that I can quickly \
         find items. Empty searches should show a hint and results should be paginated.",
    ),
];

pub const URLS: &[(&str, &str)] = &[
    ("login", "https://the-internet.herokuapp.com/login"),
    ("signup", "https://demoqa.com/automation-practice-form"),
    ("search", "https://www.saucedemo.com"),
];

fn lookup(table: &[(&'static str, &'static str)], name: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name.trim()))
        .map(|(_, value)| *value)
}

pub fn story(name: &str) -> Option<&'static str> {
    lookup(STORIES, name)
}

pub fn url(name: &str) -> Option<&'static str> {
    lookup(URLS, name)
}

/// Names accepted by `--example`
pub fn names() -> Vec<&'static str> {
    STORIES.iter().map(|(name, _)| *name).collect()
}
