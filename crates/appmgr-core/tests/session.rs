mod common;

use std::sync::Mutex;

use appmgr_core::cache::{Loadable, Mutation, QueryKey, Session};
use appmgr_core::model::{
    AppPermissions, AppVersions, InstalledApps, Permission, ResourceType, VersionPreference,
};
use appmgr_core::permissions::{Completion, Decision, PermissionRequest, RequestOutcome};
use appmgr_core::resolve::VersionState;
use appmgr_core::{Scope, Selection};

use common::{app, tracks, FakeApi, Gate};

fn backend() -> FakeApi {
    let mut api = FakeApi::new();
    api.installed = InstalledApps {
        installed: vec![app("notes", "Notes")],
        development: vec![app("scratch", "Scratch")],
        can_install: true,
    };
    api.versions.insert(
        "notes".into(),
        AppVersions {
            versions: vec!["1.0".into(), "2.0".into()],
            tracks: tracks(&[("stable", "2.0")]),
            default_track: "stable".into(),
            user: None,
            system: Some(VersionPreference::default()),
            is_admin: true,
            ..Default::default()
        },
    );
    api.permissions.insert(
        "notes".into(),
        AppPermissions {
            permissions: vec![Permission {
                permission: "group/manage".into(),
                granted: false,
                restricted: false,
            }],
        },
    );
    api
}

#[tokio::test]
async fn reads_are_served_from_cache() {
    let session = Session::new(backend());

    session.installed().await.unwrap();
    session.installed().await.unwrap();
    session.app_versions("notes").await.unwrap();
    session.app_versions("notes").await.unwrap();

    assert_eq!(session.api().count("list_installed"), 1);
    assert_eq!(session.api().count("app_versions:notes"), 1);
}

#[tokio::test]
async fn different_app_ids_are_different_entries() {
    let session = Session::new(backend());

    session.app_permissions("notes").await.unwrap();
    session.app_permissions("scratch").await.unwrap();

    assert!(session.is_cached(&QueryKey::AppPermissions("notes".into())).await);
    assert!(session.is_cached(&QueryKey::AppPermissions("scratch".into())).await);
    assert_eq!(session.api().count("app_permissions"), 2);
}

#[tokio::test]
async fn set_version_invalidates_versions_and_installed_only() {
    let session = Session::new(backend());
    session.installed().await.unwrap();
    session.app_versions("notes").await.unwrap();
    session.routing().await.unwrap();

    session
        .set_version("notes", Scope::System, &Selection::Track("stable".into()))
        .await
        .unwrap();

    assert!(!session.is_cached(&QueryKey::Installed).await);
    assert!(!session.is_cached(&QueryKey::AppVersions("notes".into())).await);
    assert!(session.is_cached(&QueryKey::Routing).await);

    session.app_versions("notes").await.unwrap();
    assert_eq!(session.api().count("app_versions:notes"), 2);
}

#[tokio::test]
async fn set_version_sends_both_fields() {
    let session = Session::new(backend());

    session
        .set_version("notes", Scope::User, &Selection::Version("1.0".into()))
        .await
        .unwrap();
    session
        .set_version("notes", Scope::User, &Selection::Default)
        .await
        .unwrap();

    let calls = session.api().calls();
    assert!(calls.contains(&"set_version:notes:user:version=1.0:track=".to_string()));
    assert!(calls.contains(&"set_version:notes:user:version=:track=".to_string()));
}

#[tokio::test]
async fn set_routing_invalidates_routing_only() {
    let session = Session::new(backend());
    session.installed().await.unwrap();
    session.app_versions("notes").await.unwrap();
    session.routing().await.unwrap();

    session
        .set_routing(ResourceType::Service, "chat", "", Scope::User)
        .await
        .unwrap();

    assert!(!session.is_cached(&QueryKey::Routing).await);
    assert!(session.is_cached(&QueryKey::Installed).await);
    assert!(session.is_cached(&QueryKey::AppVersions("notes".into())).await);
    assert!(session
        .api()
        .calls()
        .contains(&"set_routing:service:chat::user".to_string()));
}

#[tokio::test]
async fn failed_mutation_invalidates_nothing() {
    let mut api = backend();
    api.reject_mutations = true;
    let session = Session::new(api);
    session.installed().await.unwrap();
    session.app_versions("notes").await.unwrap();

    let result = session
        .set_version("notes", Scope::User, &Selection::Version("1.0".into()))
        .await;

    assert!(result.is_err());
    assert!(session.is_cached(&QueryKey::Installed).await);
    assert!(session.is_cached(&QueryKey::AppVersions("notes".into())).await);
}

#[tokio::test]
async fn upgrade_drops_apps_family() {
    let session = Session::new(backend());
    session.installed().await.unwrap();
    session.updates().await.unwrap();
    session.app_information("notes").await.unwrap();
    session.app_permissions("notes").await.unwrap();

    session.upgrade("notes", "2.0").await.unwrap();

    assert!(!session.is_cached(&QueryKey::Installed).await);
    assert!(!session.is_cached(&QueryKey::Updates).await);
    assert!(!session.is_cached(&QueryKey::AppInfo("notes".into())).await);
    assert!(session.is_cached(&QueryKey::AppPermissions("notes".into())).await);
}

#[tokio::test]
async fn fetch_overlapping_an_invalidation_is_not_cached() {
    let gate = Gate::default();
    let mut api = backend();
    api.installed_gate = Mutex::new(Some(gate.clone()));
    let session = Session::new(api);

    let read = session.installed();
    let write = async {
        gate.started.notified().await;
        session
            .set_version("notes", Scope::System, &Selection::Default)
            .await
            .unwrap();
        gate.release.notify_one();
    };
    let (apps, ()) = tokio::join!(read, write);

    assert_eq!(apps.unwrap().installed.len(), 1);
    assert!(!session.is_cached(&QueryKey::Installed).await);

    session.installed().await.unwrap();
    assert!(session.is_cached(&QueryKey::Installed).await);
    assert_eq!(session.api().count("list_installed"), 2);
}

#[test]
fn invalidation_table() {
    let set_version = Mutation::SetVersion { app: "notes".into(), scope: Scope::User };
    assert!(set_version.invalidates(&QueryKey::AppVersions("notes".into())));
    assert!(!set_version.invalidates(&QueryKey::AppVersions("chat".into())));
    assert!(set_version.invalidates(&QueryKey::Installed));
    assert!(!set_version.invalidates(&QueryKey::Routing));

    let grant = Mutation::GrantPermission { app: "notes".into() };
    assert!(grant.invalidates(&QueryKey::AppPermissions("notes".into())));
    assert!(!grant.invalidates(&QueryKey::Installed));

    assert!(!Mutation::Cleanup.invalidates(&QueryKey::Installed));
}

#[tokio::test]
async fn app_detail_loads_each_read_independently() {
    let session = Session::new(backend());

    let detail = session.load_app_detail("notes").await;

    assert_eq!(detail.app().map(|a| a.name.as_str()), Some("Notes"));
    assert_eq!(
        detail.permissions.ready().map(|p| p.permissions.len()),
        Some(1)
    );
    match detail.version_state() {
        VersionState::Resolved { resolution, .. } => {
            assert_eq!(resolution.version(), Some("2.0"));
        }
        other => panic!("unexpected state {:?}", other),
    }
}

#[tokio::test]
async fn failed_versions_read_shows_unversioned() {
    let session = Session::new(backend());

    let detail = session.load_app_detail("scratch").await;

    assert!(matches!(detail.versions, Loadable::Failed(_)));
    assert!(detail.installed.ready().is_some());
    assert_eq!(detail.app().map(|a| a.id.as_str()), Some("scratch"));
    assert_eq!(detail.version_state(), VersionState::Unversioned);
}

#[tokio::test]
async fn restricted_request_never_grants() {
    let session = Session::new(backend());
    let request = PermissionRequest::new("notes", "user/read");

    let outcome = request.respond(&session, Decision::Allow).await.unwrap();

    assert_eq!(outcome, RequestOutcome::RequiresSettings { app: "notes".into() });
    assert_eq!(session.api().count("grant_permission"), 0);
}

#[tokio::test]
async fn allowed_request_grants_and_signals_opener() {
    let session = Session::new(backend());
    session.app_permissions("notes").await.unwrap();
    let request = PermissionRequest::new("notes", "group/manage").in_popup();

    let outcome = request.respond(&session, Decision::Allow).await.unwrap();

    assert_eq!(outcome, RequestOutcome::Completed(Completion::Granted));
    assert_eq!(session.api().count("grant_permission:notes:group/manage"), 1);
    assert!(!session.is_cached(&QueryKey::AppPermissions("notes".into())).await);
}

#[tokio::test]
async fn denied_request_redirects_without_calls() {
    let session = Session::new(backend());
    let request = PermissionRequest::new("notes", "group/manage").with_return_url("/notes");

    let outcome = request.respond(&session, Decision::Deny).await.unwrap();

    assert_eq!(outcome, RequestOutcome::Redirect("/notes".into()));
    assert!(session.api().calls().is_empty());
}

#[tokio::test]
async fn incomplete_request_is_invalid() {
    let session = Session::new(backend());
    let request = PermissionRequest::new("", "group/manage");

    let outcome = request.respond(&session, Decision::Allow).await.unwrap();

    assert_eq!(outcome, RequestOutcome::Invalid);
}
