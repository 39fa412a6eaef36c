pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::get_profile)
            .service(auth::update_profile),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::toggle_task)
            .service(tasks::get_task)
            .service(tasks::replace_task)
            .service(tasks::patch_task)
            .service(tasks::delete_task),
    );
}
