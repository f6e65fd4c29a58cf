//! Unit tests for repository locators and identity wrappers.

use rstest::rstest;

use super::{MilestoneNumber, PersonalAccessToken, PullRequestNumber, RepositoryLocator};
use crate::error::PatchError;

#[rstest]
fn parses_owner_name_slug() {
    let locator = RepositoryLocator::parse("mesonbuild/meson").expect("slug should parse");
    assert_eq!(locator.owner().as_str(), "mesonbuild", "owner mismatch");
    assert_eq!(locator.repository().as_str(), "meson", "repository mismatch");
    assert_eq!(
        locator.api_base().as_str(),
        "https://api.github.com/",
        "api base mismatch"
    );
}

#[rstest]
fn parses_public_repository_url() {
    let locator = RepositoryLocator::parse("https://github.com/octo/repo.git")
        .expect("URL should parse");
    assert_eq!(locator.slug(), "octo/repo");
    assert_eq!(locator.api_base().as_str(), "https://api.github.com/");
}

#[rstest]
fn parses_enterprise_url() {
    let locator = RepositoryLocator::parse("https://ghe.example.com/foo/bar")
        .expect("enterprise URL should parse");
    assert_eq!(
        locator.api_base().as_str(),
        "https://ghe.example.com/api/v3",
        "enterprise api base mismatch"
    );
}

#[rstest]
fn enterprise_url_keeps_port() {
    let locator = RepositoryLocator::parse("http://127.0.0.1:8080/owner/repo")
        .expect("URL with port should parse");
    assert_eq!(locator.api_base().as_str(), "http://127.0.0.1:8080/api/v3");
}

#[rstest]
#[case::no_slash("meson")]
#[case::empty_owner("/meson")]
#[case::empty_name("mesonbuild/")]
#[case::too_many_segments("a/b/c")]
fn rejects_malformed_slugs(#[case] input: &str) {
    let result = RepositoryLocator::parse(input);
    assert!(
        matches!(result, Err(PatchError::InvalidRepository { .. })),
        "expected InvalidRepository for {input:?}, got {result:?}"
    );
}

#[rstest]
fn rejects_url_without_repository() {
    let result = RepositoryLocator::parse("https://github.com/octo");
    assert!(
        matches!(result, Err(PatchError::InvalidRepository { .. })),
        "expected InvalidRepository, got {result:?}"
    );
}

#[rstest]
fn builds_api_paths() {
    let locator = RepositoryLocator::parse("octo/repo").expect("slug should parse");
    let milestone = MilestoneNumber::parse("12").expect("milestone should parse");
    let pull = PullRequestNumber::new(5).expect("number should be valid");

    assert_eq!(locator.milestone_path(milestone), "/repos/octo/repo/milestones/12");
    assert_eq!(locator.issues_path(), "/repos/octo/repo/issues");
    assert_eq!(locator.pull_request_path(pull), "/repos/octo/repo/pulls/5");
}

#[rstest]
#[case::zero("0")]
#[case::negative("-3")]
#[case::word("next")]
#[case::empty("")]
fn rejects_invalid_milestone_numbers(#[case] input: &str) {
    let result = MilestoneNumber::parse(input);
    assert_eq!(
        result,
        Err(PatchError::InvalidMilestoneNumber {
            value: input.to_owned()
        })
    );
}

#[rstest]
fn accepts_padded_milestone_number() {
    let number = MilestoneNumber::parse(" 42 ").expect("padded number should parse");
    assert_eq!(number.get(), 42);
}

#[rstest]
fn rejects_zero_pull_request_number() {
    assert_eq!(
        PullRequestNumber::new(0),
        Err(PatchError::InvalidPullRequestNumber)
    );
}

#[rstest]
fn rejects_blank_token() {
    let result = PersonalAccessToken::new("   ");
    assert!(
        matches!(result, Err(PatchError::MissingToken)),
        "expected MissingToken, got {result:?}"
    );
}

#[rstest]
fn trims_token() {
    let token = PersonalAccessToken::new("  ghp_example \n").expect("token should be valid");
    assert_eq!(token.value(), "ghp_example");
}
