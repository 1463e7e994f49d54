//! Tests for mounting routers inside routers.

mod common;
use common::*;

use oxide_tree_router::{BuildError, Method, Router};

fn blog() -> Router {
    Router::build(|r| {
        r.get(|_, _| "blog index");
        r.route("posts", |r| {
            r.get(|_, _| "all posts");
            r.route("{slug}", |r| {
                r.get(|req, _| format!("post {}", req.param("slug").unwrap()));
            });
        });
    })
    .unwrap()
}

#[test]
fn mount_splices_children_without_extra_segment() {
    let blog = blog();
    let site = Router::build(|r| {
        r.route("a", |r| {
            r.mount(&blog);
        });
    })
    .unwrap();

    assert_eq!(get(&site, "/a").1, "blog index");
    assert_eq!(get(&site, "/a/posts").1, "all posts");
    assert_eq!(get(&site, "/a/posts/hello").1, "post hello");
    assert_eq!(get(&site, "/posts").0, 404);
}

#[test]
fn same_router_mounted_at_two_points() {
    let blog = blog();
    let site = Router::build(|r| {
        r.route("en", |r| {
            r.mount(&blog);
        });
        r.route("fr/{region}", |r| {
            r.mount(&blog);
        });
    })
    .unwrap();

    assert_eq!(get(&site, "/en/posts/one").1, "post one");
    assert_eq!(get(&site, "/fr/qc/posts/two").1, "post two");
    assert_eq!(send(&site, Method::Delete, "/en/posts").status, 405);

    // The mounted router itself is unaffected.
    assert_eq!(get(&blog, "/posts/three").1, "post three");
}

#[test]
fn ancestor_captures_reach_mounted_handlers() {
    let api = Router::build(|r| {
        r.route("whoami", |r| {
            r.get(|req, _| req.param("tenant").unwrap_or("none").to_string());
        });
    })
    .unwrap();

    let site = Router::build(|r| {
        r.route("{tenant}", |r| {
            r.mount(&api);
        });
    })
    .unwrap();

    assert_eq!(get(&site, "/acme/whoami").1, "acme");
}

#[test]
fn mounted_root_hooks_join_the_host_node() {
    let trail = Trail::new();

    let inner_trail = trail.clone();
    let app = Router::build(move |r| {
        r.before(move |_, _| inner_trail.push("app"));
        r.route("b", |r| {
            r.get(|_, _| "app b");
        });
    })
    .unwrap();

    let before_trail = trail.clone();
    let after_trail = trail.clone();
    let site = Router::build(move |r| {
        r.route("a", move |r| {
            r.before(move |_, _| before_trail.push("host"));
            r.mount(&app);
            r.before(move |_, _| after_trail.push("host-late"));
            r.get(|_, _| "local root");
            r.route("local", |r| {
                r.get(|_, _| "local");
            });
        });
    })
    .unwrap();

    assert_eq!(get(&site, "/a/b").1, "app b");
    assert_eq!(trail.take(), vec!["host", "app", "host-late"]);

    assert_eq!(get(&site, "/a").1, "local root");
    assert_eq!(trail.take(), vec!["host", "app", "host-late"]);

    assert_eq!(get(&site, "/a/local").1, "local");
    assert_eq!(trail.take(), vec!["host", "app", "host-late"]);

    assert_eq!(get(&site, "/a/nope").0, 404);
    assert!(trail.take().is_empty());
}

#[test]
fn nested_mounts_resolve() {
    let comments = Router::build(|r| {
        r.route("comments", |r| {
            r.get(|req, _| format!("comments on {}", req.param("id").unwrap()));
        });
    })
    .unwrap();

    let posts = Router::build(|r| {
        r.route("posts/{id}", |r| {
            r.mount(&comments);
        });
    })
    .unwrap();

    let site = Router::build(|r| {
        r.route("api", |r| {
            r.mount(&posts);
        });
    })
    .unwrap();

    assert_eq!(get(&site, "/api/posts/9/comments").1, "comments on 9");
}

#[test]
fn several_mounts_at_one_node_union() {
    let users = Router::build(|r| {
        r.route("users", |r| {
            r.get(|_, _| "users");
        });
    })
    .unwrap();
    let orders = Router::build(|r| {
        r.route("orders", |r| {
            r.get(|_, _| "orders");
        });
    })
    .unwrap();

    let site = Router::build(|r| {
        r.mount(&users);
        r.mount(&orders);
        r.route("health", |r| {
            r.get(|_, _| "ok");
        });
    })
    .unwrap();

    assert_eq!(get(&site, "/users").1, "users");
    assert_eq!(get(&site, "/orders").1, "orders");
    assert_eq!(get(&site, "/health").1, "ok");

    let paths: Vec<String> = site.routes().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/health", "/orders", "/users"]);
}

#[test]
fn static_of_host_wins_over_capture_of_mount() {
    let app = Router::build(|r| {
        r.route("{id}", |r| {
            r.get(|req, _| format!("id {}", req.param("id").unwrap()));
        });
    })
    .unwrap();

    let site = Router::build(|r| {
        r.route("new", |r| {
            r.get(|_, _| "new form");
        });
        r.mount(&app);
    })
    .unwrap();

    assert_eq!(get(&site, "/new").1, "new form");
    assert_eq!(get(&site, "/42").1, "id 42");
}

#[test]
fn conflicting_label_fails_build() {
    let blog = blog();
    let err = Router::build(|r| {
        r.route("posts", |r| {
            r.get(|_, _| "mine");
        });
        r.mount(&blog);
    })
    .unwrap_err();

    match err {
        BuildError::MountConflict { path, reason } => {
            assert_eq!(path, "/");
            assert!(reason.contains("posts"), "{reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn local_route_after_mount_conflicts() {
    let blog = blog();
    let err = Router::build(|r| {
        r.route("x", |r| {
            r.mount(&blog);
            r.route("posts", |_| {});
        });
    })
    .unwrap_err();

    assert!(matches!(err, BuildError::MountConflict { ref path, .. } if path == "/x"));
}

#[test]
fn conflicting_handler_fails_build() {
    let blog = blog();
    let err = Router::build(|r| {
        r.mount(&blog);
        r.get(|_, _| "my index");
    })
    .unwrap_err();

    assert!(matches!(err, BuildError::MountConflict { .. }));
}

#[test]
fn mounting_twice_at_one_node_fails_build() {
    let blog = blog();
    let err = Router::build(|r| {
        r.mount(&blog);
        r.mount(&blog);
    })
    .unwrap_err();

    assert!(matches!(err, BuildError::MountConflict { .. }));
}

#[test]
fn capture_overlap_with_mount_fails_build() {
    let app = Router::build(|r| {
        r.route("{id}", |r| {
            r.get(|_, _| "app");
        });
    })
    .unwrap();

    let err = Router::build(|r| {
        r.route("{slug}", |r| {
            r.get(|_, _| "host");
        });
        r.mount(&app);
    })
    .unwrap_err();

    assert!(matches!(err, BuildError::MountConflict { .. }));
}
