use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::services::gemini_service::GenerateRequest;
use crate::services::providers::Providers;

/*
    POST /api/ai/generate-itinerary
*/
pub async fn generate_itinerary(
    providers: web::Data<Providers>,
    input: web::Json<GenerateRequest>,
) -> Result<HttpResponse, ApiError> {
    let brief = input.into_inner().validate()?;
    let client = providers.gemini()?;

    let generated = client.generate(brief).await?;
    Ok(HttpResponse::Ok().json(generated))
}
