//! Verification against real repositories created with `git2`.

use std::fs;

use camino::Utf8PathBuf;
use git2::{ErrorCode, Oid, Repository};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::{MissingSubject, is_accounted_for, verify_applied};
use crate::error::PatchError;
use crate::patches::{PatchDirectory, PatchFileName};

type TestError = Box<dyn std::error::Error>;

struct ReleaseRepo {
    _temp_dir: TempDir,
    repo_path: Utf8PathBuf,
    repo: Repository,
    store: PatchDirectory,
}

impl ReleaseRepo {
    fn commit(&self, message: &str) -> Result<Oid, TestError> {
        let sig = self.repo.signature()?;
        let tree_id = self.repo.index()?.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(error) if error.code() == ErrorCode::UnbornBranch => None,
            Err(error) => return Err(error.into()),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        Ok(self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?)
    }

    fn tag(&self, name: &str, oid: Oid) -> Result<(), TestError> {
        let object = self.repo.find_object(oid, None)?;
        self.repo.tag_lightweight(name, &object, false)?;
        Ok(())
    }

    fn branch(&self, name: &str, oid: Oid) -> Result<(), TestError> {
        let commit = self.repo.find_commit(oid)?;
        self.repo.branch(name, &commit, true)?;
        Ok(())
    }

    fn applied(&self, file: &str, subjects: &[&str]) -> Result<(), TestError> {
        let done = self.store.done_root();
        fs::create_dir_all(&done)?;
        let body: String = subjects
            .iter()
            .map(|subject| format!("From 0 Mon Sep 17 00:00:00 2001\nSubject: [PATCH] {subject}\n\n"))
            .collect();
        fs::write(done.join(file), body)?;
        Ok(())
    }
}

#[fixture]
fn release_repo() -> Result<ReleaseRepo, TestError> {
    let temp_dir = TempDir::new()?;
    let base = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf())
        .map_err(|path| format!("non-UTF-8 temp dir: {}", path.display()))?;
    let repo_path = base.join("meson");
    let repo = Repository::init(&repo_path)?;
    let mut config = repo.config()?;
    config.set_str("user.name", "Test User")?;
    config.set_str("user.email", "test@example.com")?;

    Ok(ReleaseRepo {
        _temp_dir: temp_dir,
        repo_path,
        repo,
        store: PatchDirectory::new(base.join("patches")),
    })
}

/// Release branch `1.5` tagged `1.5.0` and `1.5.1`, with two backports on top.
fn with_backports(fixture: &ReleaseRepo) -> Result<(), TestError> {
    let base = fixture.commit("Release 1.5.0")?;
    fixture.tag("1.5.0", base)?;
    let old = fixture.commit("Release 1.5.1")?;
    fixture.tag("1.5.1", old)?;
    fixture.commit("Fix crash on startup")?;
    let head = fixture.commit("ninja backend: handle very long command lines in response files")?;
    fixture.branch("1.5", head)?;
    Ok(())
}

#[rstest]
fn all_applied_subjects_found(release_repo: Result<ReleaseRepo, TestError>) {
    let fixture = release_repo.expect("fixture should succeed");
    with_backports(&fixture).expect("history should be created");
    fixture
        .applied("2024-07-02T140000--PR11.patch", &["Fix crash on startup"])
        .expect("patch should be written");
    fixture
        .applied(
            "2024-07-03T140000--PR12.patch",
            &["ninja backend: handle very long command lines in resp"],
        )
        .expect("patch should be written");

    let report = verify_applied(&fixture.repo_path, "1.5", &fixture.store)
        .expect("verification should run");

    assert_eq!(report.last_tag, "1.5.1");
    assert_eq!(report.commits, 2);
    assert_eq!(report.subjects, 2);
    assert!(report.is_complete(), "unexpected misses: {:?}", report.missing);
}

#[rstest]
fn reports_subject_missing_from_branch(release_repo: Result<ReleaseRepo, TestError>) {
    let fixture = release_repo.expect("fixture should succeed");
    with_backports(&fixture).expect("history should be created");
    fixture
        .applied("2024-07-04T140000--PR13.patch", &["Release 1.5.1", "Add new option"])
        .expect("patch should be written");

    let report = verify_applied(&fixture.repo_path, "1.5", &fixture.store)
        .expect("verification should run");

    let patch = PatchFileName::parse("2024-07-04T140000--PR13.patch")
        .expect("name should be valid");
    assert_eq!(
        report.missing,
        vec![
            MissingSubject {
                subject: "Add new option".to_owned(),
                patch: patch.clone(),
            },
            MissingSubject {
                subject: "Release 1.5.1".to_owned(),
                patch,
            },
        ],
        "commits at or before the tag do not count"
    );
}

#[rstest]
fn branch_without_tags_is_an_error(release_repo: Result<ReleaseRepo, TestError>) {
    let fixture = release_repo.expect("fixture should succeed");
    let head = fixture.commit("Initial").expect("commit should succeed");
    fixture.branch("2.0", head).expect("branch should be created");

    let error = verify_applied(&fixture.repo_path, "2.0", &fixture.store)
        .expect_err("missing tags should fail");

    assert_eq!(
        error,
        PatchError::NoReleaseTags {
            pattern: "2.0.*".to_owned()
        }
    );
}

#[rstest]
fn empty_done_directory_is_an_error(release_repo: Result<ReleaseRepo, TestError>) {
    let fixture = release_repo.expect("fixture should succeed");
    with_backports(&fixture).expect("history should be created");

    let error = verify_applied(&fixture.repo_path, "1.5", &fixture.store)
        .expect_err("no applied patches should fail");

    assert_eq!(
        error,
        PatchError::NoAppliedPatches {
            path: fixture.store.done_root().to_string()
        }
    );
}

#[rstest]
#[case::exact("Fix crash", true)]
#[case::truncated("Fix cra", true)]
#[case::absent("Add option", false)]
fn containment_counts_as_match(#[case] subject: &str, #[case] expected: bool) {
    let commits = vec!["Fix crash".to_owned(), "Bump version".to_owned()];

    assert_eq!(is_accounted_for(subject, &commits), expected);
}
