pub mod health;
pub mod todos;
pub mod users;

use actix_web::web;

use crate::auth::AuthGuard;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(users::signup)
            .service(users::login)
            .service(
                web::scope("/me")
                    .wrap(AuthGuard)
                    .service(users::me)
                    .service(users::logout),
            ),
    )
    .service(
        web::scope("/todos")
            .wrap(AuthGuard)
            .service(todos::list_todos)
            .service(todos::create_todo)
            .service(todos::get_todo)
            .service(todos::update_todo)
            .service(todos::delete_todo),
    );
}
