use lwf_http::{Kernel, Request, Response, Result};
use lwf_router::{Route, Router};

async fn post_show(req: Request) -> Result<Response> {
    let id = req.attribute("id").unwrap_or_default().to_string();
    Ok(Response::json(&serde_json::json!({ "id": id, "viewer": req.user.login() })))
}

async fn post_edit(req: Request) -> Result<Response> {
    Ok(Response::text(format!(
        "editing {}",
        req.attribute("id").unwrap_or_default()
    )))
}

/// A blog kernel: public posts, an editor-only edit page and a login page.
pub fn blog_kernel() -> Kernel {
    let mut router = Router::new();
    router
        .add_route(
            "post_show",
            Route::new("/posts/{id}")
                .with_requirement("id", r"\d+")
                .unwrap()
                .with_methods(["GET"]),
        )
        .unwrap();
    router
        .add_route(
            "post_edit",
            Route::new("/posts/{id}/edit")
                .with_requirement("id", r"\d+")
                .unwrap()
                .with_methods(["GET", "POST"])
                .with_roles(["editor"])
                .unwrap()
                .with_default("_controller", "blog::edit"),
        )
        .unwrap();
    router.add_route("login", Route::new("/login")).unwrap();

    Kernel::new(router)
        .handler("post_show", post_show)
        .handler("blog::edit", post_edit)
        .handler("login", |_req| async { Ok(Response::html("<form></form>")) })
}
