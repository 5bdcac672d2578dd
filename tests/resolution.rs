use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use wireup::{Render, RegistryBuilder, Scope};

struct Sidebar;

impl Render for Sidebar {
    fn render(&self) -> String {
        "<aside>nav</aside>".to_string()
    }
}

#[tokio::test]
async fn it_wires_an_application_registry_end_to_end() {
    let mut builder = RegistryBuilder::new();
    builder.register("app_name", "demo".to_string());
    builder.register_lazy("locale", || "en-US".to_string());
    builder.register_component("sidebar", Sidebar);
    builder.register_hook("titlecase", |s: String| {
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    });
    builder.register_deferred("feature_flags", || async {
        Ok(vec!["beta_panel".to_string()].into())
    });

    let scope = Scope::new(builder.build());

    let app_name: Option<String> = scope.use_dependency("app_name").unwrap();
    assert_eq!(app_name.as_deref(), Some("demo"));

    let locale: Option<String> = scope.use_dependency("locale").unwrap();
    assert_eq!(locale.as_deref(), Some("en-US"));

    assert_eq!(scope.use_component("sidebar").unwrap().render(), "<aside>nav</aside>");

    let title: String = scope.use_hook("titlecase", ("dashboard".to_string(),)).unwrap();
    assert_eq!(title, "Dashboard");

    scope.settled("feature_flags").await;
    let flags: Option<Vec<String>> = scope.use_dependency("feature_flags").unwrap();
    assert_eq!(flags.unwrap(), ["beta_panel"]);
}

#[tokio::test]
async fn dropping_the_scope_cancels_inflight_loads() {
    let completed = Arc::new(AtomicBool::new(false));
    let flag = completed.clone();

    let mut builder = RegistryBuilder::new();
    builder.register_deferred("profile", move || {
        let flag = flag.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            flag.store(true, Ordering::SeqCst);
            Ok("loaded".to_string().into())
        }
    });

    let scope = Scope::new(builder.build());
    let pending: Option<String> = scope.use_dependency("profile").unwrap();
    assert_eq!(pending, None);

    drop(scope);
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(!completed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn settlements_apply_one_at_a_time_in_settlement_order() {
    let mut builder = RegistryBuilder::new();
    builder.register_deferred("fast", || async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok("fast".to_string().into())
    });
    builder.register_deferred("slow", || async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok("slow".to_string().into())
    });

    let scope = Scope::new(builder.build());
    let mut updates = scope.updates();

    let _: Option<String> = scope.use_dependency("fast").unwrap();
    let _: Option<String> = scope.use_dependency("slow").unwrap();

    updates.changed().await.unwrap();
    assert_eq!(*updates.borrow_and_update(), 1);

    let fast: Option<String> = scope.use_dependency("fast").unwrap();
    let slow: Option<String> = scope.use_dependency("slow").unwrap();
    assert_eq!(fast.as_deref(), Some("fast"));
    assert_eq!(slow, None);

    updates.changed().await.unwrap();
    assert_eq!(*updates.borrow_and_update(), 2);

    let slow: Option<String> = scope.use_dependency("slow").unwrap();
    assert_eq!(slow.as_deref(), Some("slow"));
}

#[tokio::test]
async fn rejected_loads_are_logged_and_release_waiters() {
    tracing_subscriber::fmt()
        .with_env_filter("wireup=error")
        .try_init()
        .ok();

    let mut builder = RegistryBuilder::new();
    builder.register_deferred_with_default("profile", "guest".to_string(), || async {
        Err("profile service unavailable".into())
    });

    let scope = Scope::new(builder.build());

    let before: Option<String> = scope.use_dependency("profile").unwrap();
    assert_eq!(before.as_deref(), Some("guest"));

    scope.settled("profile").await;

    let after: Option<String> = scope.use_dependency("profile").unwrap();
    assert_eq!(after.as_deref(), Some("guest"));
}

#[tokio::test]
async fn two_scopes_track_resolution_independently() {
    let mut builder = RegistryBuilder::new();
    builder.register_deferred("session", || async { Ok("alice".to_string().into()) });
    let registry = builder.build();

    let resolved_scope = Scope::new(registry.clone());
    let untouched_scope = Scope::new(registry);

    let _: Option<String> = resolved_scope.use_dependency("session").unwrap();
    resolved_scope.settled("session").await;

    let resolved: Option<String> = resolved_scope.use_dependency("session").unwrap();
    assert_eq!(resolved.as_deref(), Some("alice"));

    // the other scope has not observed the key yet: its own cycle starts fresh
    let pending: Option<String> = untouched_scope.use_dependency("session").unwrap();
    assert_eq!(pending, None);
}

#[test]
fn direct_values_resolve_without_a_runtime() {
    let mut builder = RegistryBuilder::new();
    builder.register("app_name", "demo".to_string());
    builder.register_component("sidebar", Sidebar);

    let scope = Scope::new(builder.build());

    let app_name: Option<String> = scope.use_dependency("app_name").unwrap();
    assert_eq!(app_name.as_deref(), Some("demo"));
    assert!(!scope.use_component("sidebar").unwrap().render().is_empty());
}

#[test]
fn shared_resolution_avoids_cloning() {
    let mut builder = RegistryBuilder::new();
    builder.register("config", vec![1_u8, 2, 3]);

    let scope = Scope::new(builder.build());

    let first = scope.use_dependency_shared::<Vec<u8>>("config").unwrap().unwrap();
    let second = scope.use_dependency_shared::<Vec<u8>>("config").unwrap().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}
