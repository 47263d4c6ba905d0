use tera::Tera;

use crate::error::AppError;

/// Name under which the home page template is registered
pub const HOME_TEMPLATE: &str = "home.html";

/// Initialize the Tera template engine.
///
/// Templates are compiled into the binary so the service does not depend on
/// its working directory.
pub fn init_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_template(HOME_TEMPLATE, include_str!("../templates/home.html"))?;
    Ok(tera)
}
