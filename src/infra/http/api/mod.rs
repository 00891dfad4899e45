pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    routing::{get, post},
};

const MENU: &str = "/menus/{menu_id}";
const SUBMENU: &str = "/menus/{menu_id}/submenus/{submenu_id}";
const DISH: &str = "/menus/{menu_id}/submenus/{submenu_id}/dishes/{dish_id}";

/// Routes served under `/api/v1`.
pub fn build_api_router() -> Router<ApiState> {
    Router::new()
        .route(
            "/menus",
            get(handlers::list_menus).post(handlers::create_menu),
        )
        .route(
            MENU,
            get(handlers::get_menu)
                .patch(handlers::update_menu)
                .delete(handlers::delete_menu),
        )
        .route(
            "/menus/{menu_id}/submenus",
            get(handlers::list_submenus).post(handlers::create_submenu),
        )
        .route(
            SUBMENU,
            get(handlers::get_submenu)
                .patch(handlers::update_submenu)
                .delete(handlers::delete_submenu),
        )
        .route(
            "/menus/{menu_id}/submenus/{submenu_id}/dishes",
            get(handlers::list_dishes).post(handlers::create_dish),
        )
        .route(
            DISH,
            get(handlers::get_dish)
                .patch(handlers::update_dish)
                .delete(handlers::delete_dish),
        )
        .route("/data_report", post(handlers::submit_report))
        .route("/data_report/add_test_data", post(handlers::add_test_data))
        .route("/data_report/{task_id}", get(handlers::report_status))
}
