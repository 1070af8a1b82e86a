pub mod routes;
pub mod slug;
pub mod store;
pub mod types;

use warp::{http::Method, Filter};

use crate::store::Store;

/// Wires every named endpoint into one filter tree: home, list, add, detail,
/// edit, delete, success, plus login/registration. Mutating routes take their
/// author from the session token; anonymous requests are recovered into a
/// login redirect by `handle_errors::return_error`.
pub fn build_routes(
    store: Store,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let store_filter = warp::any().map(move || store.clone());

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["Content-Type", "Authorization"])
        .allow_methods(&[Method::PUT, Method::DELETE, Method::GET, Method::POST]);

    let home = warp::get()
        .and(warp::path::end())
        .and_then(routes::note::home);

    let list_notes = warp::get()
        .and(warp::path("notes"))
        .and(warp::path::end())
        .and(routes::authentication::auth_optional())
        .and(warp::path::full())
        .and(store_filter.clone())
        .and_then(routes::note::list_notes)
        .with(warp::trace(|info| {
            tracing::info_span!(
                "list_notes request",
                method = %info.method(),
                path = %info.path(),
                id = %uuid::Uuid::new_v4(),
            )
        }));

    let add_note_page = warp::get()
        .and(warp::path("notes"))
        .and(warp::path("add"))
        .and(warp::path::end())
        .and(routes::authentication::auth_optional())
        .and(warp::path::full())
        .and_then(routes::note::add_note_page);

    let add_note = warp::post()
        .and(warp::path("notes"))
        .and(warp::path("add"))
        .and(warp::path::end())
        .and(routes::authentication::auth_optional())
        .and(warp::path::full())
        .and(store_filter.clone())
        .and(warp::body::json())
        .and_then(routes::note::add_note);

    let note_detail = warp::get()
        .and(warp::path("notes"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(routes::authentication::auth_optional())
        .and(warp::path::full())
        .and(store_filter.clone())
        .and_then(routes::note::note_detail);

    let edit_note_page = warp::get()
        .and(warp::path("notes"))
        .and(warp::path::param::<String>())
        .and(warp::path("edit"))
        .and(warp::path::end())
        .and(routes::authentication::auth_optional())
        .and(warp::path::full())
        .and(store_filter.clone())
        .and_then(routes::note::edit_note_page);

    let update_note = warp::post()
        .and(warp::path("notes"))
        .and(warp::path::param::<String>())
        .and(warp::path("edit"))
        .and(warp::path::end())
        .and(routes::authentication::auth_optional())
        .and(warp::path::full())
        .and(store_filter.clone())
        .and(warp::body::json())
        .and_then(routes::note::update_note);

    let delete_note_page = warp::get()
        .and(warp::path("notes"))
        .and(warp::path::param::<String>())
        .and(warp::path("delete"))
        .and(warp::path::end())
        .and(routes::authentication::auth_optional())
        .and(warp::path::full())
        .and(store_filter.clone())
        .and_then(routes::note::delete_note_page);

    let delete_note = warp::post()
        .and(warp::path("notes"))
        .and(warp::path::param::<String>())
        .and(warp::path("delete"))
        .and(warp::path::end())
        .and(routes::authentication::auth_optional())
        .and(warp::path::full())
        .and(store_filter.clone())
        .and_then(routes::note::delete_note);

    let success_page = warp::get()
        .and(warp::path("done"))
        .and(warp::path::end())
        .and(routes::authentication::auth_optional())
        .and(warp::path::full())
        .and_then(routes::note::success_page);

    let login_page = warp::get()
        .and(warp::path("auth"))
        .and(warp::path("login"))
        .and(warp::path::end())
        .and_then(routes::authentication::login_page);

    let login = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(store_filter.clone())
        .and(warp::body::json())
        .and_then(routes::authentication::login);

    let registration = warp::post()
        .and(warp::path("auth"))
        .and(warp::path("register"))
        .and(warp::path::end())
        .and(store_filter.clone())
        .and(warp::body::json())
        .and_then(routes::authentication::register);

    home.or(list_notes)
        .or(add_note_page)
        .or(add_note)
        .or(edit_note_page)
        .or(update_note)
        .or(delete_note_page)
        .or(delete_note)
        .or(note_detail)
        .or(success_page)
        .or(login_page)
        .or(login)
        .or(registration)
        .with(warp::trace::request())
        .with(cors)
        .recover(handle_errors::return_error)
}
