//! Shared demo inventory for tests, benchmarks and the CLI.

pub struct DemoAccount {
    pub owner: &'static str,
    pub source_usernames: &'static [&'static str],
    pub target_handle: Option<&'static str>,
    pub group_name: Option<&'static str>,
}

pub struct DemoPost {
    pub source_id: &'static str,
    pub source_username: &'static str,
    pub text: &'static str,
    pub target_handle: Option<&'static str>,
    pub owner: Option<&'static str>,
}

pub const DEMO_ACCOUNTS: &[DemoAccount] = &[
    // --- The nvidia pair: both score above threshold, jill wins ---
    DemoAccount {
        owner: "jack",
        source_usernames: &["nvidianetworkng"],
        target_handle: None,
        group_name: None,
    },
    DemoAccount {
        owner: "jill",
        source_usernames: &["nvidia_news"],
        target_handle: None,
        group_name: None,
    },
    // --- Unrelated accounts ---
    DemoAccount {
        owner: "amy",
        source_usernames: &["rustlang", "rust_weekly"],
        target_handle: Some("@rust@hachyderm.io"),
        group_name: Some("languages"),
    },
    DemoAccount {
        owner: "bob",
        source_usernames: &["sqlite"],
        target_handle: Some("@sqlite@fosstodon.org"),
        group_name: Some("databases"),
    },
    DemoAccount {
        owner: "carol",
        source_usernames: &["postgres", "pgsql_news"],
        target_handle: Some("@postgresql@fosstodon.org"),
        group_name: Some("databases"),
    },
    DemoAccount {
        owner: "dave",
        source_usernames: &["tokio_rs"],
        target_handle: None,
        group_name: Some("languages"),
    },
];

pub const DEMO_POSTS: &[DemoPost] = &[
    DemoPost {
        source_id: "1001",
        source_username: "nvidia_news",
        text: "New GPU architecture announced at the keynote",
        target_handle: Some("@nvidia@mastodon.social"),
        owner: Some("jill"),
    },
    DemoPost {
        source_id: "1002",
        source_username: "nvidianetworkng",
        text: "Spectrum-X ethernet for AI clusters",
        target_handle: None,
        owner: Some("jack"),
    },
    DemoPost {
        source_id: "1003",
        source_username: "rustlang",
        text: "Announcing Rust 1.80: lazy cells are stable",
        target_handle: Some("@rust@hachyderm.io"),
        owner: Some("amy"),
    },
    DemoPost {
        source_id: "1004",
        source_username: "sqlite",
        text: "Release 3.46 brings a faster query planner",
        target_handle: None,
        owner: None,
    },
    DemoPost {
        source_id: "1005",
        source_username: "tokio_rs",
        text: "#async runtime release notes, cancellation tokens improved",
        target_handle: None,
        owner: Some("dave"),
    },
];
