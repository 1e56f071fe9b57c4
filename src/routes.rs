use crate::{
    api::{audit_log, employee, overtime, payroll, traffic_fine},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    // Public routes
    cfg.service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(build_limiter(config.rate_login_per_min))
                .route(web::post().to(handlers::login)),
        ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(build_limiter(config.rate_protected_per_min))
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}/fines
                    .service(
                        web::resource("/{id}/fines")
                            .route(web::get().to(traffic_fine::list_employee_fines)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    // /payroll?month=&year=
                    .service(
                        web::resource("")
                            .route(web::get().to(payroll::get_period_entries))
                            .route(web::put().to(payroll::batch_update)),
                    )
                    // /payroll/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payroll::get_entry))
                            .route(web::put().to(payroll::update_entry)),
                    ),
            )
            .service(
                web::scope("/overtime")
                    // /overtime
                    .service(
                        web::resource("")
                            .route(web::post().to(overtime::create_overtime))
                            .route(web::get().to(overtime::list_overtime)),
                    )
                    // /overtime/{id}
                    .service(
                        web::resource("/{id}").route(web::delete().to(overtime::delete_overtime)),
                    ),
            )
            .service(
                web::scope("/fines")
                    // /fines
                    .service(web::resource("").route(web::post().to(traffic_fine::create_fine)))
                    // /fines/payments/{id}
                    .service(
                        web::resource("/payments/{id}")
                            .route(web::delete().to(traffic_fine::delete_fine_payment)),
                    )
                    // /fines/{id}/payments
                    .service(
                        web::resource("/{id}/payments")
                            .route(web::post().to(traffic_fine::create_fine_payment)),
                    )
                    // /fines/{id}
                    .service(web::resource("/{id}").route(web::get().to(traffic_fine::get_fine))),
            )
            .service(
                web::scope("/audit")
                    .service(web::resource("").route(web::get().to(audit_log::list_audit_logs))),
            ),
    );
}
