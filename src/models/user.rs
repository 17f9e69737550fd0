use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::validation;
use crate::entities::user;
use crate::error::AppError;

pub const DEFAULT_USER_PAGE_SIZE: u64 = 20;
pub const MAX_USER_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Startup,
    Investor,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Startup => "startup",
            UserRole::Investor => "investor",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "startup" => Ok(UserRole::Startup),
            "investor" => Ok(UserRole::Investor),
            "admin" => Ok(UserRole::Admin),
            other => Err(AppError::ValidationFailed(format!("Unknown role '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvestorType {
    Angel,
    VentureCapital,
    PrivateEquity,
    Corporate,
    Government,
}

impl InvestorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestorType::Angel => "angel",
            InvestorType::VentureCapital => "venture_capital",
            InvestorType::PrivateEquity => "private_equity",
            InvestorType::Corporate => "corporate",
            InvestorType::Government => "government",
        }
    }
}

/// Attributes of a standard (non startup, non investor) account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    /// Age in years, 13 to 120
    pub age: u8,
    pub gender: Gender,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartupProfile {
    pub company_name: String,
    /// SAS, SARL, SA, ...
    pub legal_status: String,
    pub address: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_media_url: Option<String>,
    pub description: String,
    pub sector: String,
    /// Ideation, Prototype, MVP, ...
    pub maturity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs: Option<String>,
    #[schema(value_type = String, format = Date, example = "2022-01-15")]
    pub founding_date: NaiveDate,
    /// Headcount, 1 to 1000
    pub team_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvestmentRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvestorProfile {
    pub investor_type: InvestorType,
    pub investment_range: InvestmentRange,
    pub preferred_sectors: Vec<String>,
    pub preferred_stages: Vec<String>,
    /// Companies currently held, 0 to 1000
    pub portfolio_size: u32,
    /// Years of investment experience, 0 to 50
    pub investment_experience: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_criteria: Option<String>,
    #[serde(default)]
    pub geographical_preferences: Vec<String>,
}

/// Role specific attributes, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Profile {
    User(MemberProfile),
    Startup(StartupProfile),
    Investor(InvestorProfile),
}

impl Profile {
    /// The self-service role that owns these attributes.
    pub fn role(&self) -> UserRole {
        match self {
            Profile::User(_) => UserRole::User,
            Profile::Startup(_) => UserRole::Startup,
            Profile::Investor(_) => UserRole::Investor,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        match self {
            Profile::User(p) => validation::in_range("age", p.age, 13, 120),
            Profile::Startup(p) => {
                validation::not_blank("companyName", &p.company_name)?;
                validation::not_blank("legalStatus", &p.legal_status)?;
                validation::not_blank("description", &p.description)?;
                validation::not_blank("sector", &p.sector)?;
                validation::not_blank("maturity", &p.maturity)?;
                validation::optional_url("websiteUrl", p.website_url.as_deref())?;
                validation::optional_url("socialMediaUrl", p.social_media_url.as_deref())?;
                validation::in_range("teamSize", p.team_size, 1, 1000)
            }
            Profile::Investor(p) => {
                let range = &p.investment_range;
                if range.min < 0.0 || range.max < 0.0 {
                    return Err(AppError::ValidationFailed(
                        "investmentRange bounds must not be negative".into(),
                    ));
                }
                if range.min > range.max {
                    return Err(AppError::ValidationFailed(
                        "investmentRange.min must not exceed investmentRange.max".into(),
                    ));
                }
                validation::in_range("portfolioSize", p.portfolio_size, 0, 1000)?;
                validation::in_range("investmentExperience", p.investment_experience, 0, 50)?;
                validation::optional_url("linkedinUrl", p.linkedin_url.as_deref())?;
                validation::optional_url("companyWebsite", p.company_website.as_deref())
            }
        }
    }

    pub fn sector(&self) -> Option<&str> {
        match self {
            Profile::Startup(p) => Some(&p.sector),
            _ => None,
        }
    }

    pub fn investor_type(&self) -> Option<InvestorType> {
        match self {
            Profile::Investor(p) => Some(p.investor_type),
            _ => None,
        }
    }
}

/// Account fields common to every registration body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::email(&self.email)?;
        validation::password(&self.password)?;
        validation::not_blank("firstName", &self.first_name)?;
        validation::not_blank("lastName", &self.last_name)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    #[serde(flatten)]
    pub account: Credentials,
    #[serde(flatten)]
    pub profile: MemberProfile,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterStartupRequest {
    #[serde(flatten)]
    pub account: Credentials,
    #[serde(flatten)]
    pub profile: StartupProfile,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterInvestorRequest {
    #[serde(flatten)]
    pub account: Credentials,
    #[serde(flatten)]
    pub profile: InvestorProfile,
}

/// Validated registration, ready to be stored.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub account: Credentials,
    pub profile: Profile,
}

impl NewAccount {
    pub fn new(account: Credentials, profile: Profile) -> Result<Self, AppError> {
        account.validate()?;
        profile.validate()?;
        Ok(Self { account, profile })
    }
}

impl TryFrom<RegisterUserRequest> for NewAccount {
    type Error = AppError;

    fn try_from(req: RegisterUserRequest) -> Result<Self, Self::Error> {
        NewAccount::new(req.account, Profile::User(req.profile))
    }
}

impl TryFrom<RegisterStartupRequest> for NewAccount {
    type Error = AppError;

    fn try_from(req: RegisterStartupRequest) -> Result<Self, Self::Error> {
        NewAccount::new(req.account, Profile::Startup(req.profile))
    }
}

impl TryFrom<RegisterInvestorRequest> for NewAccount {
    type Error = AppError;

    fn try_from(req: RegisterInvestorRequest) -> Result<Self, Self::Error> {
        NewAccount::new(req.account, Profile::Investor(req.profile))
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "user@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

/// Partial update of the caller's own account. A replacement `profile`
/// must keep the same `kind`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile: Option<Profile>,
}

/// Public view of an account. The password hash never leaves the store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub uid: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub profile: Profile,
    pub is_email_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<user::Model> for UserView {
    type Error = AppError;

    fn try_from(model: user::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            role: model.role.parse()?,
            profile: serde_json::from_value(model.profile)?,
            id: model.id,
            uid: model.uid,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            is_email_verified: model.is_email_verified,
            last_login_at: model.last_login_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: UserView,
    /// Bearer token for the `Authorization` header
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserView,
}

/// One page of a user listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub users: Vec<UserView>,
    /// Pass back as `pageToken` to fetch the next page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Page size (default: 20, max: 100)
    pub limit: Option<u64>,
    /// `nextPageToken` of the previous page
    pub page_token: Option<String>,
    /// Only users holding this role
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StartupProfilesQuery {
    /// Page size (default: 20, max: 100)
    pub limit: Option<u64>,
    /// `nextPageToken` of the previous page
    pub page_token: Option<String>,
    /// Exact sector of the startup profile
    pub sector: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InvestorProfilesQuery {
    /// Page size (default: 20, max: 100)
    pub limit: Option<u64>,
    /// `nextPageToken` of the previous page
    pub page_token: Option<String>,
    pub investor_type: Option<InvestorType>,
}
