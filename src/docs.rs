use utoipa::OpenApi;
use crate::{handlers, models};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_power_devices,
        handlers::get_power_device,
        handlers::update_power_device,
        handlers::turn_on_device,
        handlers::turn_off_device,
        handlers::list_actions,
        handlers::perform_action,
    ),
    components(
        schemas(models::PowerDeviceView, models::ActionView, models::UpdateResponse)
    )
)]
pub struct ApiDoc;
