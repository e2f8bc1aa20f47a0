use chrono::NaiveDate;

use crate::domain::commands::babies::{CreateBabyCommand, UpdateBabyCommand};
use crate::domain::models::baby::{Baby as DomainBaby, BabyValidationError};
use shared::{Baby as SharedBaby, BabyListResponse, BabyResponse, CreateBabyRequest, UpdateBabyRequest};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Mapper between shared Baby DTOs and the domain Baby model.
pub struct BabyMapper;

fn parse_dob(raw: Option<String>) -> Result<Option<NaiveDate>, BabyValidationError> {
    let Some(raw) = raw.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| BabyValidationError::InvalidDob(raw))
}

impl BabyMapper {
    pub fn to_create_command(request: CreateBabyRequest) -> Result<CreateBabyCommand, BabyValidationError> {
        Ok(CreateBabyCommand {
            name: request.name,
            dob: parse_dob(request.dob)?,
            parent_email: request.parent_email,
        })
    }

    pub fn to_update_command(
        baby_id: &str,
        request: UpdateBabyRequest,
    ) -> Result<UpdateBabyCommand, BabyValidationError> {
        Ok(UpdateBabyCommand {
            baby_id: baby_id.to_string(),
            name: request.name,
            dob: parse_dob(request.dob)?,
            parent_email: request.parent_email,
        })
    }

    pub fn to_dto(domain: DomainBaby) -> SharedBaby {
        SharedBaby {
            id: domain.id,
            name: domain.name,
            dob: domain.dob.map(|d| d.format(DATE_FORMAT).to_string()),
            parent_email: domain.parent_email,
            created_at: domain.created_at.to_rfc3339(),
        }
    }

    pub fn to_baby_response_dto(domain: DomainBaby, message: &str) -> BabyResponse {
        BabyResponse {
            baby: Self::to_dto(domain),
            success_message: message.to_string(),
        }
    }

    pub fn to_baby_list_dto(babies: Vec<DomainBaby>) -> BabyListResponse {
        BabyListResponse {
            babies: babies.into_iter().map(Self::to_dto).collect(),
        }
    }
}
