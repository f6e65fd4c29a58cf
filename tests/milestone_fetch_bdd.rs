//! Behavioural tests for fetching milestone patches from a mock GitHub API.

mod support;

use camino::Utf8PathBuf;
use milepatch::patches::UnmilestonedFix;
use milepatch::{
    FetchReport, MilestoneFetcher, MilestoneNumber, OctocrabMilestoneGateway, PatchDirectory,
    PatchError, PersonalAccessToken, RepositoryLocator,
};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::runtime::{SharedRuntime, ensure_runtime_and_server};
use support::{create_temp_dir, mailbox_patch, utf8_path};

#[derive(ScenarioState, Default)]
struct FetchState {
    runtime: Slot<SharedRuntime>,
    server: Slot<MockServer>,
    temp_dir: Slot<TempDir>,
    items: Slot<Vec<Value>>,
    report: Slot<FetchReport>,
    error: Slot<PatchError>,
}

#[fixture]
fn fetch_state() -> FetchState {
    FetchState::default()
}

fn runtime(fetch_state: &FetchState) -> SharedRuntime {
    ensure_runtime_and_server(&fetch_state.runtime, &fetch_state.server)
        .unwrap_or_else(|error| panic!("failed to start runtime and server: {error}"))
}

fn mount(fetch_state: &FetchState, mock: Mock) {
    let shared_runtime = runtime(fetch_state);
    fetch_state
        .server
        .with_ref(|server| shared_runtime.block_on(mock.mount(server)))
        .unwrap_or_else(|| panic!("mock server not initialised"));
}

fn patches_root(fetch_state: &FetchState) -> Utf8PathBuf {
    if fetch_state.temp_dir.with_ref(|_| ()).is_none() {
        fetch_state.temp_dir.set(create_temp_dir());
    }
    fetch_state
        .temp_dir
        .with_ref(|temp_dir| utf8_path(temp_dir).join("patches"))
        .unwrap_or_else(|| panic!("temporary directory not initialised"))
}

fn push_item(fetch_state: &FetchState, item: Value) {
    let mut items = fetch_state.items.take().unwrap_or_default();
    items.push(item);
    fetch_state.items.set(items);
}

fn merge_commit(pull: u64) -> String {
    format!("{pull:040x}")
}

fn push_closed_issue(fetch_state: &FetchState, number: u64) {
    push_item(
        fetch_state,
        json!({
            "number": number,
            "title": format!("Bug {number}"),
            "html_url": format!("https://github.com/owner/repo/issues/{number}"),
            "closed_at": "2024-07-01T08:00:00Z"
        }),
    );
}

fn mount_events(fetch_state: &FetchState, number: u64, events: Value) {
    mount(
        fetch_state,
        Mock::given(method("GET"))
            .and(path(format!("/api/v3/repos/owner/repo/issues/{number}/events")))
            .respond_with(ResponseTemplate::new(200).set_body_json(events)),
    );
}

fn report(fetch_state: &FetchState) -> FetchReport {
    fetch_state.report.get().unwrap_or_else(|| {
        let error = fetch_state.error.get();
        panic!("fetch did not succeed: {error:?}")
    })
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or_else(|error| panic!("count out of range: {error}"))
}

// --- Given steps ---

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[given("a milestone {number:u64} titled {title}")]
fn seed_milestone(fetch_state: &FetchState, number: u64, title: String) {
    if fetch_state.items.with_ref(|_| ()).is_none() {
        fetch_state.items.set(Vec::new());
    }

    mount(
        fetch_state,
        Mock::given(method("GET"))
            .and(path(format!("/api/v3/repos/owner/repo/milestones/{number}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "number": number, "title": title.trim_matches('"') })),
            ),
    );
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[given("a merged pull request {number:u64} merged at {merged_at}")]
fn seed_merged_pull_request(fetch_state: &FetchState, number: u64, merged_at: String) {
    push_item(
        fetch_state,
        json!({
            "number": number,
            "title": format!("Backport {number}"),
            "html_url": format!("https://github.com/owner/repo/pull/{number}"),
            "closed_at": merged_at,
            "pull_request": { "merged_at": merged_at }
        }),
    );

    mount(
        fetch_state,
        Mock::given(method("GET"))
            .and(path(format!("/api/v3/repos/owner/repo/pulls/{number}")))
            .and(header("accept", "application/vnd.github.v3.patch"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(mailbox_patch(&format!("Backport {number}"))),
            ),
    );
    mount_events(
        fetch_state,
        number,
        json!([
            { "event": "merged", "commit_id": merge_commit(number) },
            { "event": "closed", "commit_id": null }
        ]),
    );
}

#[given("a closed issue {number:u64} fixed by pull request {pull:u64}")]
fn seed_issue_fixed_by_pull(fetch_state: &FetchState, number: u64, pull: u64) {
    push_closed_issue(fetch_state, number);
    mount_events(
        fetch_state,
        number,
        json!([
            { "event": "closed", "commit_id": null },
            { "event": "referenced", "commit_id": merge_commit(pull) }
        ]),
    );
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[given("a closed issue {number:u64} fixed by commit {commit}")]
fn seed_issue_fixed_by_commit(fetch_state: &FetchState, number: u64, commit: String) {
    push_closed_issue(fetch_state, number);
    mount_events(
        fetch_state,
        number,
        json!([{ "event": "closed", "commit_id": commit.trim() }]),
    );
}

#[given("an unmerged pull request {number:u64}")]
fn seed_unmerged_pull_request(fetch_state: &FetchState, number: u64) {
    push_item(
        fetch_state,
        json!({
            "number": number,
            "title": "Abandoned change",
            "html_url": format!("https://github.com/owner/repo/pull/{number}"),
            "closed_at": "2024-07-03T08:00:00Z",
            "pull_request": { "merged_at": null }
        }),
    );
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[given("the patch {file_name} was already applied")]
fn seed_applied_patch(fetch_state: &FetchState, file_name: String) {
    let done = patches_root(fetch_state).join("done");
    std::fs::create_dir_all(&done)
        .unwrap_or_else(|error| panic!("failed to create {done}: {error}"));
    std::fs::write(done.join(file_name.trim()), mailbox_patch("Already applied"))
        .unwrap_or_else(|error| panic!("failed to write applied patch: {error}"));
}

#[given("a GitHub API that rejects the token")]
fn seed_rejecting_server(fetch_state: &FetchState) {
    mount(
        fetch_state,
        Mock::given(method("GET")).respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })),
        ),
    );
}

// --- When steps ---

#[when("milestone {number:u64} is fetched")]
fn fetch_milestone(fetch_state: &FetchState, number: u64) {
    let shared_runtime = runtime(fetch_state);

    if let Some(items) = fetch_state.items.get() {
        mount(
            fetch_state,
            Mock::given(method("GET"))
                .and(path("/api/v3/repos/owner/repo/issues"))
                .and(query_param("milestone", number.to_string()))
                .and(query_param("state", "closed"))
                .respond_with(ResponseTemplate::new(200).set_body_json(items)),
        );
    }

    let server_uri = fetch_state
        .server
        .with_ref(MockServer::uri)
        .unwrap_or_else(|| panic!("mock server URL missing"));
    let locator = RepositoryLocator::parse(&format!("{server_uri}/owner/repo"))
        .unwrap_or_else(|error| panic!("invalid repository locator: {error}"));
    let milestone = MilestoneNumber::parse(&number.to_string())
        .unwrap_or_else(|error| panic!("invalid milestone: {error}"));
    let store = PatchDirectory::new(patches_root(fetch_state));

    let result = shared_runtime.block_on(async {
        let token = PersonalAccessToken::new("valid-token")?;
        let gateway = OctocrabMilestoneGateway::for_token(&token, &locator)?;
        MilestoneFetcher::new(&gateway, &store)
            .fetch(&locator, milestone)
            .await
    });

    match result {
        Ok(fetched) => {
            drop(fetch_state.error.take());
            fetch_state.report.set(fetched);
        }
        Err(error) => {
            drop(fetch_state.report.take());
            fetch_state.error.set(error);
        }
    }
}

// --- Then steps ---

#[then("the fetch reports {issues:u64} closed issues and {pulls:u64} merged pull requests")]
fn assert_counts(fetch_state: &FetchState, issues: u64, pulls: u64) {
    let fetched = report(fetch_state);

    assert_eq!(fetched.closed_issues, to_usize(issues), "closed issues");
    assert_eq!(fetched.merged_pull_requests, to_usize(pulls), "merged pull requests");
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[then("the pending patches are {names}")]
fn assert_pending(fetch_state: &FetchState, names: String) {
    let store = PatchDirectory::new(patches_root(fetch_state));
    let pending: Vec<String> = store
        .pending()
        .unwrap_or_else(|error| panic!("failed to list pending patches: {error}"))
        .iter()
        .map(ToString::to_string)
        .collect();
    let expected: Vec<String> = names
        .split(',')
        .map(|name| name.trim().to_owned())
        .collect();

    assert_eq!(pending, expected);
}

#[then("the fetch skipped {count:u64} patches")]
fn assert_skipped(fetch_state: &FetchState, count: u64) {
    assert_eq!(report(fetch_state).skipped.len(), to_usize(count));
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "rstest-bdd passes owned step arguments"
)]
#[then("the fetch warns that issue {number:u64} was fixed by commit {commit}")]
fn assert_unmilestoned_fix(fetch_state: &FetchState, number: u64, commit: String) {
    let fixes = report(fetch_state).unmilestoned_fixes;

    assert_eq!(
        fixes,
        vec![UnmilestonedFix {
            issue: number,
            url: format!("https://github.com/owner/repo/issues/{number}"),
            commit: commit.trim().to_owned(),
        }]
    );
}

#[then("the fetch reports no unmilestoned fixes")]
fn assert_no_unmilestoned_fixes(fetch_state: &FetchState) {
    let fixes = report(fetch_state).unmilestoned_fixes;

    assert!(fixes.is_empty(), "unexpected warnings: {fixes:?}");
}

#[then("no patch directory was created")]
fn assert_no_directory(fetch_state: &FetchState) {
    let root = patches_root(fetch_state);

    assert!(!root.exists(), "{root} should not exist");
}

#[then("the fetch fails naming pull request {number:u64}")]
fn assert_unmerged(fetch_state: &FetchState, number: u64) {
    let error = fetch_state
        .error
        .get()
        .unwrap_or_else(|| panic!("expected the fetch to fail"));

    assert!(
        matches!(error, PatchError::UnmergedPullRequest { number: found, .. } if found == number),
        "unexpected error: {error:?}"
    );
}

#[then("the fetch fails with an authentication error")]
fn assert_authentication(fetch_state: &FetchState) {
    let error = fetch_state
        .error
        .get()
        .unwrap_or_else(|| panic!("expected the fetch to fail"));

    assert!(
        matches!(error, PatchError::Authentication { .. }),
        "unexpected error: {error:?}"
    );
}

#[scenario(path = "tests/features/milestone_fetch.feature", index = 0)]
fn merged_pull_requests_in_merge_order(fetch_state: FetchState) {
    let _ = fetch_state;
}

#[scenario(path = "tests/features/milestone_fetch.feature", index = 1)]
fn applied_patches_not_refetched(fetch_state: FetchState) {
    let _ = fetch_state;
}

#[scenario(path = "tests/features/milestone_fetch.feature", index = 2)]
fn empty_milestone_writes_nothing(fetch_state: FetchState) {
    let _ = fetch_state;
}

#[scenario(path = "tests/features/milestone_fetch.feature", index = 3)]
fn unmerged_pull_request_aborts(fetch_state: FetchState) {
    let _ = fetch_state;
}

#[scenario(path = "tests/features/milestone_fetch.feature", index = 4)]
fn rejected_token_fails(fetch_state: FetchState) {
    let _ = fetch_state;
}

#[scenario(path = "tests/features/milestone_fetch.feature", index = 5)]
fn issue_fixed_outside_milestone_warns(fetch_state: FetchState) {
    let _ = fetch_state;
}
