use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use cuidame_core::{ErrorBody, MessageResponse, PaginationMeta, PaginationParams};

use crate::middleware::context::{
    AccountStatus, AuthContext, FamilyMembership, MembershipRole, MembershipStatus, Principal,
    UserRole,
};
use crate::modules::auth::model::{AuthResponse, LoginRequest, RegisterRequest};
use crate::modules::events::model::{CreateEventRequest, Event, UpdateEventRequest};
use crate::modules::expenses::model::{
    CategoryTotal, CreateExpenseRequest, Expense, ExpenseSummary, UpdateExpenseRequest,
};
use crate::modules::families::model::{
    CreateFamilyRequest, FamilyDetails, FamilyGroup, FamilyMember, JoinFamilyRequest,
};
use crate::modules::medicines::model::{CreateMedicineRequest, Medicine, UpdateMedicineRequest};
use crate::modules::schedules::model::{CreateScheduleRequest, Schedule, UpdateScheduleRequest};
use crate::modules::users::model::{ChangePasswordRequest, UpdateProfileRequest};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::verify,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::update_profile,
        crate::modules::users::controller::change_password,
        crate::modules::users::controller::list_users,
        crate::modules::families::controller::create_family,
        crate::modules::families::controller::join_family,
        crate::modules::families::controller::my_family,
        crate::modules::families::controller::leave_family,
        crate::modules::schedules::controller::list_schedules,
        crate::modules::schedules::controller::get_schedule,
        crate::modules::schedules::controller::create_schedule,
        crate::modules::schedules::controller::update_schedule,
        crate::modules::schedules::controller::delete_schedule,
        crate::modules::medicines::controller::list_medicines,
        crate::modules::medicines::controller::get_medicine,
        crate::modules::medicines::controller::create_medicine,
        crate::modules::medicines::controller::update_medicine,
        crate::modules::medicines::controller::delete_medicine,
        crate::modules::expenses::controller::list_expenses,
        crate::modules::expenses::controller::expense_summary,
        crate::modules::expenses::controller::get_expense,
        crate::modules::expenses::controller::create_expense,
        crate::modules::expenses::controller::update_expense,
        crate::modules::expenses::controller::delete_expense,
        crate::modules::events::controller::list_events,
        crate::modules::events::controller::get_event,
        crate::modules::events::controller::create_event,
        crate::modules::events::controller::update_event,
        crate::modules::events::controller::delete_event,
    ),
    components(
        schemas(
            ErrorBody,
            MessageResponse,
            PaginationMeta,
            PaginationParams,
            UserRole,
            AccountStatus,
            MembershipRole,
            MembershipStatus,
            Principal,
            FamilyMembership,
            AuthContext,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UpdateProfileRequest,
            ChangePasswordRequest,
            FamilyGroup,
            FamilyMember,
            FamilyDetails,
            CreateFamilyRequest,
            JoinFamilyRequest,
            Schedule,
            CreateScheduleRequest,
            UpdateScheduleRequest,
            Medicine,
            CreateMedicineRequest,
            UpdateMedicineRequest,
            Expense,
            CreateExpenseRequest,
            UpdateExpenseRequest,
            CategoryTotal,
            ExpenseSummary,
            Event,
            CreateEventRequest,
            UpdateEventRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Autenticación", description = "Registration, login and token verification"),
        (name = "Usuarios", description = "Own profile and account administration"),
        (name = "Familias", description = "Family groups and membership"),
        (name = "Horarios", description = "Caregiving shifts"),
        (name = "Medicamentos", description = "Medicines and treatments"),
        (name = "Gastos", description = "Shared care expenses"),
        (name = "Eventos", description = "Calendar events")
    ),
    info(
        title = "CuidaMe API",
        version = "0.1.0",
        description = "REST backend for coordinating the care of an elderly family member.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_group_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/registro",
            "/api/usuarios/perfil",
            "/api/familias/unirse",
            "/api/horarios/{id}",
            "/api/medicamentos",
            "/api/gastos/resumen",
            "/api/eventos/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let schemes = doc.components.unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
