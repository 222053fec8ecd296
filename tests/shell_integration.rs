//! End-to-end tests for the guarded shell
//!
//! Each test builds fresh store, router and shell instances and drives them
//! through the router and auth service the way the client does.

use app_core::{AccountDirectory, AuthService, DemoSeed, LoginParams, DEMO_PASSWORD};
use app_state::{Role, Session, StateStore, User};
use app_ui::{
    chrome_visibility, AppShell, BottomNav, ChromeVisibility, Content, Frame, Header, Route,
    RouteParams, Router, ShellContext, ShellOptions, ToastQueue, View,
};
use marketplace_shell::{App, ShellConfig};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Harness {
    store: Arc<StateStore>,
    router: Arc<Router>,
    auth: AuthService,
    toasts: Arc<ToastQueue>,
    shell: AppShell,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(StateStore::new());
        let router = Arc::new(Router::new());
        let directory = Arc::new(AccountDirectory::new());
        let auth = AuthService::new(Arc::clone(&store), Arc::clone(&directory));
        let toasts = Arc::new(ToastQueue::new());
        let shell = AppShell::new(
            ShellContext {
                store: Arc::clone(&store),
                router: Arc::clone(&router),
                notifier: toasts.clone(),
                bootstrap: Arc::new(DemoSeed::new(directory)),
            },
            ShellOptions::default(),
        );
        assert!(shell.start());
        Self {
            store,
            router,
            auth,
            toasts,
            shell,
        }
    }

    fn login(&self, email: &str) {
        self.auth
            .login(LoginParams {
                email: email.to_string(),
                password: DEMO_PASSWORD.to_string(),
            })
            .expect("demo login");
    }

    fn login_as(&self, role: Role) {
        self.login(match role {
            Role::Client => "cliente@demo.com",
            Role::Provider => "prestador@demo.com",
            Role::Admin => "admin@demo.com",
        });
    }

    fn record_frames(&self) -> (Arc<Mutex<Vec<Frame>>>, app_state::Subscription) {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&frames);
        let subscription = self
            .shell
            .subscribe_frames(move |frame| sink.lock().push(frame.clone()));
        (frames, subscription)
    }
}

fn shows(frame: &Frame, view: &View) -> bool {
    frame.view() == Some(view)
}

#[test]
fn protected_routes_redirect_anonymous_visitors_to_login() {
    for route in Route::KNOWN.iter().filter(|route| route.requires_auth()) {
        let harness = Harness::new();
        let (frames, _subscription) = harness.record_frames();

        let params = if route.is_parameterized() {
            RouteParams::from([("id".to_string(), "7".to_string())])
        } else {
            RouteParams::new()
        };
        let requested = app_ui::dispatch_view(route, &params, true);
        harness.router.navigate(route.clone(), params);

        assert_eq!(harness.router.current_route(), Route::Login, "{route}");
        let frames = frames.lock();
        assert!(
            frames.iter().all(|frame| !shows(frame, &requested)),
            "{route} leaked its view"
        );
        assert!(shows(frames.last().unwrap(), &View::Login));
        assert!(harness.toasts.is_empty());
    }
}

#[test]
fn forbidden_routes_redirect_to_dashboard_with_one_toast() {
    for role in Role::ALL {
        for route in Route::KNOWN.iter().filter(|route| !route.permits(role)) {
            let harness = Harness::new();
            harness.login_as(role);

            harness.router.navigate_to(route.clone());

            assert_eq!(harness.router.current_route(), Route::Dashboard);
            assert!(shows(&harness.shell.render(), &View::Dashboard));
            assert_eq!(harness.toasts.len(), 1, "{role} -> {route}");
            assert_eq!(harness.toasts.toasts()[0].message, "Access denied");

            // Re-rendering and unrelated store changes do not notify again
            harness.shell.render();
            harness.store.set_unread_count(4);
            assert_eq!(harness.toasts.len(), 1);
        }
    }
}

#[test]
fn each_violating_transition_notifies_once() {
    let harness = Harness::new();
    harness.login_as(Role::Provider);

    harness.router.navigate_to(Route::NewOrder);
    harness.router.navigate_to(Route::Orders);
    harness.router.navigate_to(Route::Admin);

    assert_eq!(harness.toasts.len(), 2);
    assert_eq!(harness.router.current_route(), Route::Dashboard);
}

#[test]
fn authentication_is_checked_before_authorization() {
    let harness = Harness::new();
    // Admin would also be forbidden for any non-admin role
    harness.router.navigate_to(Route::Admin);

    assert_eq!(harness.router.current_route(), Route::Login);
    assert!(harness.toasts.is_empty());
}

#[test]
fn auth_forms_show_dashboard_without_redirect_loop() {
    let harness = Harness::new();
    harness.login_as(Role::Client);

    let navigations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&navigations);
    let _subscription = harness.router.subscribe(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    for route in [Route::Login, Route::Register, Route::Login, Route::Login] {
        harness.router.navigate_to(route.clone());
        assert_eq!(harness.router.current_route(), route);
        assert!(shows(&harness.shell.render(), &View::Dashboard));
    }
    // One event per explicit navigation, none added by the guard
    assert_eq!(navigations.load(Ordering::SeqCst), 4);
}

#[test]
fn unknown_route_falls_back_to_home() {
    let harness = Harness::new();
    harness.router.navigate_path("/does/not/exist");

    assert!(matches!(
        harness.router.current_route(),
        Route::Unrecognized(_)
    ));
    assert!(shows(&harness.shell.render(), &View::Home));

    harness.router.navigate_name("bogus-view", RouteParams::new());
    assert!(shows(&harness.shell.render(), &View::Home));
}

#[test]
fn chrome_visibility_follows_route_and_session() {
    let harness = Harness::new();

    harness.router.navigate_to(Route::Login);
    assert_eq!(
        harness.shell.render().chrome(),
        Some(ChromeVisibility {
            header: false,
            bottom_nav: false
        })
    );

    harness.login_as(Role::Client);
    harness.router.navigate_to(Route::Dashboard);
    assert_eq!(
        harness.shell.render().chrome(),
        Some(ChromeVisibility {
            header: true,
            bottom_nav: true
        })
    );

    harness.router.navigate_to(Route::Login);
    assert_eq!(
        harness.shell.render().chrome(),
        Some(chrome_visibility(&Route::Login, true))
    );
}

#[test]
fn anonymous_dashboard_frame_shows_header_only_before_redirect() {
    let harness = Harness::new();
    let (frames, _subscription) = harness.record_frames();

    harness.router.navigate_to(Route::Dashboard);

    let frames = frames.lock();
    let pre_redirect = frames
        .iter()
        .find(|frame| matches!(frame, Frame::Ready { route: Route::Dashboard, .. }))
        .expect("dashboard frame");
    assert_eq!(
        pre_redirect,
        &Frame::Ready {
            route: Route::Dashboard,
            chrome: ChromeVisibility {
                header: true,
                bottom_nav: false
            },
            content: Content::Redirecting { to: Route::Login },
        }
    );
}

#[test]
fn teardown_releases_every_listener() {
    let harness = Harness::new();
    let header = Header::mount(&harness.store, Arc::clone(&harness.router), harness.auth.clone());
    let bottom_nav = BottomNav::mount(&harness.store, Arc::clone(&harness.router));

    let frames = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&frames);
    let frame_subscription = harness.shell.subscribe_frames(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    harness.router.navigate_to(Route::Home);
    assert!(frames.load(Ordering::SeqCst) > 0);

    let Harness {
        store,
        router,
        auth,
        shell,
        ..
    } = harness;
    drop(header);
    drop(bottom_nav);
    shell.unmount();
    assert_eq!(store.subscriber_count(), 0);
    assert_eq!(router.subscriber_count(), 0);

    let before = frames.load(Ordering::SeqCst);
    router.navigate_to(Route::Orders);
    store.set_session(Session::signed_in(User::new("Late", Role::Client)));
    auth.logout();
    assert_eq!(frames.load(Ordering::SeqCst), before);

    // No guard ran after teardown
    assert_eq!(router.current_route(), Route::Orders);
    drop(frame_subscription);
}

#[test]
fn logout_clears_session_and_protects_routes() {
    let harness = Harness::new();
    harness.login_as(Role::Client);
    harness.router.navigate_to(Route::Orders);
    assert!(shows(&harness.shell.render(), &View::Orders));

    harness.auth.logout();

    let state = harness.store.get_state();
    assert!(!state.is_authenticated());
    assert!(state.user().is_none());
    // The shell was on a protected route and is sent to login
    assert_eq!(harness.router.current_route(), Route::Login);

    harness.router.navigate_to(Route::Chat);
    assert_eq!(harness.router.current_route(), Route::Login);
}

#[test]
fn stale_authenticated_flag_without_user_is_anonymous() {
    let harness = Harness::new();
    harness.store.set_session(Session {
        is_authenticated: true,
        user: None,
    });

    harness.router.navigate_to(Route::Profile);

    assert_eq!(harness.router.current_route(), Route::Login);
    assert!(shows(&harness.shell.render(), &View::Login));
    assert!(harness.toasts.is_empty());
}

#[test]
fn parameterized_routes_pass_id_through() {
    let harness = Harness::new();
    harness.router.navigate_path("/providers/p-9");
    assert_eq!(
        harness.shell.render().view(),
        Some(&View::ProviderProfile {
            provider_id: Some("p-9".to_string())
        })
    );

    harness.login_as(Role::Client);
    harness.router.navigate_path("/orders/o-1?tab=chat");
    assert_eq!(
        harness.shell.render().view(),
        Some(&View::OrderDetail {
            order_id: Some("o-1".to_string())
        })
    );
}

#[test]
fn app_session_end_to_end() {
    let app = App::new(&ShellConfig::default());
    assert_eq!(app.screen().frame, Frame::Loading);
    app.start();

    app.handle("open /admin".parse().unwrap()).unwrap();
    assert_eq!(app.router().current_route(), Route::Login);

    app.handle("login cliente@demo.com demo123".parse().unwrap())
        .unwrap();
    app.handle("unread 150".parse().unwrap()).unwrap();
    app.handle("select admin".parse().unwrap()).unwrap();

    let screen = app.screen();
    assert_eq!(screen.frame.view(), Some(&View::Dashboard));
    assert_eq!(screen.toasts.len(), 1);
    let header = screen.header.expect("header");
    assert_eq!(header.unread_badge, "99+");
    assert_eq!(header.initials, "AS");
    let active: Vec<_> = screen
        .bottom_nav
        .expect("bottom nav")
        .items
        .into_iter()
        .filter(|entry| entry.active)
        .map(|entry| entry.item.route)
        .collect();
    assert_eq!(active, vec![Route::Dashboard]);

    // Toasts are handed out once
    assert!(app.screen().toasts.is_empty());

    app.handle("logout".parse().unwrap()).unwrap();
    let screen = app.screen();
    assert_eq!(screen.frame.view(), Some(&View::Home));
    assert!(screen.bottom_nav.is_none());
    assert!(app.auth().current_user().is_none());
}

#[test]
fn app_registers_new_provider() {
    let app = App::new(&ShellConfig::default());
    app.start();
    app.handle(
        "register provider rita@example.com s3cret Rita Alves"
            .parse()
            .unwrap(),
    )
    .unwrap();

    assert_eq!(app.store().get_state().session.role(), Some(Role::Provider));
    app.handle("tab proposals".parse().unwrap()).unwrap();
    assert_eq!(app.screen().frame.view(), Some(&View::Proposals));
}

#[test]
fn config_file_drives_startup() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"initialRoute":"/orders","accessDeniedMessage":"Acesso negado","seedDemoData":false}}"#
    )
    .unwrap();
    let config = ShellConfig::load(file.path()).unwrap();

    let app = App::new(&config);
    assert_eq!(app.router().current_route(), Route::Orders);
    app.start();
    assert_eq!(app.router().current_route(), Route::Login);

    // Nothing seeded
    assert!(app
        .handle("login cliente@demo.com demo123".parse().unwrap())
        .is_err());

    app.store()
        .set_session(Session::signed_in(User::new("Ana", Role::Client)));
    app.handle("open /admin".parse().unwrap()).unwrap();
    let toasts = app.screen().toasts;
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, "Acesso negado");
}
