// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures used by the REST API, plus the closed
//! vocabularies (gender, pet size, subscription type and the seven pet
//! attribute categories). Vocabulary types are validated at the JSON boundary
//! by serde and map one-to-one onto PostgreSQL enum types.
//!
//! ## Model Categories
//!
//! - **Vocabularies**: `Gender`, `PetSize`, `SubscriptionType`, pet attributes
//! - **Users**: `CreateUserRequest`, `UserResponse` and the partial updates
//!   `UpdateUserRequest`, `UpdateSubscriptionRequest`, `UpdateNotificationsRequest`
//! - **Pets**: `CreatePetRequest`, `PetResponse`, `UpdatePetRequest`,
//!   `UpdatePetAttributesRequest`

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Defines a closed string vocabulary backed by a PostgreSQL enum type.
///
/// Every variant is paired with its wire/database label. The generated type
/// exposes `ALL` (declaration order) and `as_str()`.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident as $pg_type:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize, ToSchema, sqlx::Type,
        )]
        #[sqlx(type_name = $pg_type)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                #[sqlx(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// =============================================================================
// Vocabularies
// =============================================================================

vocabulary! {
    /// Gender of a user or a pet.
    Gender as "gender" {
        Male => "male",
        Female => "female",
    }
}

vocabulary! {
    /// Subscription state of a user.
    SubscriptionType as "subscription_type" {
        Active => "active",
        Inactive => "inactive",
        Unknown => "unknown",
    }
}

vocabulary! {
    PetSize as "pet_size" {
        Small => "small",
        Medium => "medium",
        Large => "large",
    }
}

vocabulary! {
    PetAggressionLevel as "pet_aggression_level" {
        NonAggressive => "Non-aggressive",
        GuardingBehavior => "Guarding behavior",
        MildAggression => "Mild aggression under specific circumstances",
        KnownHistoryOfAggression => "Known history of aggression",
    }
}

vocabulary! {
    /// Food allergies. `None` is an explicit answer, not an absent value.
    PetAllergy as "pet_allergy" {
        NoAllergy => "None",
        Beef => "Beef",
        Chicken => "Chicken",
        Lamb => "Lamb",
        Pork => "Pork",
        Fish => "Fish",
        Eggs => "Eggs",
        Milk => "Milk",
        Cheese => "Cheese",
        Barley => "Barley",
        Wheat => "Wheat",
        Corn => "Corn",
        Soy => "Soy",
        Peanuts => "Peanuts",
        Sesame => "Sesame",
        Millet => "Millet",
        Rice => "Rice",
        Oats => "Oats",
        TreeNuts => "Tree Nuts",
        Yeast => "Yeast",
        Fruits => "Fruits",
    }
}

vocabulary! {
    PetBehavior as "pet_behavior" {
        Obedient => "Obedient",
        Stubborn => "Stubborn",
        Curious => "Curious",
        Alert => "Alert",
        Relaxed => "Relaxed",
        Anxious => "Anxious",
        Fearful => "Fearful",
        Confident => "Confident",
        Aggressive => "Aggressive",
        Timid => "Timid",
        Dominant => "Dominant",
        Submissive => "Submissive",
    }
}

vocabulary! {
    PetBreed as "pet_breed" {
        MixedBreed => "Mixed breed",
        Beagle => "Beagle",
        BerneseMountainDog => "Bernese Mountain Dog",
        BorderCollie => "Border Collie",
        Boxer => "Boxer",
        CavalierKingCharlesSpaniel => "Cavalier King Charles Spaniel",
        Chihuahua => "Chihuahua",
        Dachshund => "Dachshund",
        DobermanPinscher => "Doberman Pinscher",
        FrenchBulldog => "French Bulldog",
        GermanShepherd => "German Shepherd",
        GoldenRetriever => "Golden Retriever",
        GreatDane => "Great Dane",
        LabradorRetriever => "Labrador Retriever",
        Maltese => "Maltese",
        Pomeranian => "Pomeranian",
        Poodle => "Poodle",
        Pug => "Pug",
        Rottweiler => "Rottweiler",
        ShihTzu => "Shih Tzu",
        SiberianHusky => "Siberian Husky",
        YorkshireTerrier => "Yorkshire Terrier",
    }
}

vocabulary! {
    PetInteraction as "pet_interaction" {
        LovesOtherDogs => "Loves other dogs",
        PrefersHumanCompany => "Prefers human company",
        GoodWithChildren => "Good with children",
        GoodWithOtherPets => "Good with cats/other pets",
        EnjoysLargeGroups => "Enjoys large groups",
        PrefersOneOnOne => "Prefers one-on-one interactions",
    }
}

vocabulary! {
    PetPersonality as "pet_personality" {
        Playful => "Playful",
        Energetic => "Energetic",
        Shy => "Shy",
        Outgoing => "Outgoing",
        Calm => "Calm",
        Reserved => "Reserved",
        Affectionate => "Affectionate",
        Independent => "Independent",
    }
}

vocabulary! {
    PetReactivity as "pet_reactivity" {
        NonReactive => "Non-reactive",
        Strangers => "Reactive to strangers",
        Noises => "Reactive to noises",
        MovingObjects => "Reactive to moving objects",
        SpecificSituations => "Reactive to specific situations",
        SameGenderDogs => "Reactive to same gender dogs",
    }
}

// =============================================================================
// Column Limits
// =============================================================================

/// Width of `users.name` and `pets.name`.
pub const MAX_NAME_LEN: usize = 255;
/// Width of `users.timezone`.
pub const MAX_TIMEZONE_LEN: usize = 64;
/// Width of `users.external_id`.
pub const MAX_EXTERNAL_ID_LEN: usize = 64;

/// Largest weight that fits the `NUMERIC(5, 2)` column.
const MAX_WEIGHT: Decimal = Decimal::from_parts(99_999, 0, 0, false, 2);

// VARCHAR widths count characters, not bytes.
fn check_len(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("{field} must be at most {max} characters."));
    }
    Ok(())
}

fn check_weight(weight: Decimal) -> Result<(), String> {
    if weight.is_sign_negative() && !weight.is_zero() {
        return Err("Weight must not be negative.".to_string());
    }
    // "12.500" carries scale 3 but only two significant decimals.
    if weight.normalize().scale() > 2 {
        return Err("Weight supports at most two decimal places.".to_string());
    }
    if weight > MAX_WEIGHT {
        return Err(format!("Weight must not exceed {MAX_WEIGHT}."));
    }
    Ok(())
}

/// Checks a token subject against the width of `users.external_id`.
pub fn validate_external_id(external_id: &str) -> Result<(), String> {
    check_len("External id", external_id, MAX_EXTERNAL_ID_LEN)
}

// =============================================================================
// User Models
// =============================================================================

/// Notification toggles of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notifications {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub is_registered: bool,
    #[serde(default)]
    pub daily_enabled: bool,
    #[serde(default)]
    pub playtime_enabled: bool,
}

/// Subscription of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub subscription_type: SubscriptionType,
    #[serde(default)]
    pub is_trial_mode: bool,
    /// Trial start date (`YYYY-MM-DD`).
    #[schema(value_type = String, format = Date, example = "2025-01-01")]
    pub trial_start_date: NaiveDate,
}

/// Request body for `POST /api/v1/users`.
///
/// The external identifier is never part of the body; it is taken from the
/// verified token subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub gender: Gender,
    #[serde(default)]
    pub has_onboarded: bool,
    /// IANA timezone name, e.g. `Europe/Madrid`.
    pub timezone: String,
    #[serde(default)]
    pub notifications: Notifications,
    pub subscription: Subscription,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        check_len("Name", &self.name, MAX_NAME_LEN)?;
        check_len("Timezone", &self.timezone, MAX_TIMEZONE_LEN)
    }
}

/// Request body for `PATCH /api/v1/users`. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_onboarded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            check_len("Name", name, MAX_NAME_LEN)?;
        }
        if let Some(timezone) = &self.timezone {
            check_len("Timezone", timezone, MAX_TIMEZONE_LEN)?;
        }
        Ok(())
    }
}

/// Request body for `PATCH /api/v1/users/subscription`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<SubscriptionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_trial_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date, example = "2025-01-01")]
    pub trial_start_date: Option<NaiveDate>,
}

/// Request body for `PATCH /api/v1/users/notifications`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotificationsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_registered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playtime_enabled: Option<bool>,
}

/// Fully composed user: base fields, subscription and notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[serde(rename = "externalID")]
    pub external_id: String,
    #[serde(flatten)]
    pub user: CreateUserRequest,
}

// =============================================================================
// Pet Models
// =============================================================================

/// Relationship between a user and a pet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPetLink {
    #[serde(default)]
    pub is_dog_owner: bool,
    #[serde(default)]
    pub is_dog_sitter: bool,
}

/// Pet attributes. Each list is a many-valued association; empty lists are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PetAttributes {
    #[serde(default)]
    pub aggression_levels: Vec<PetAggressionLevel>,
    #[serde(default)]
    pub allergies: Vec<PetAllergy>,
    #[serde(default)]
    pub behaviors: Vec<PetBehavior>,
    #[serde(default)]
    pub breeds: Vec<PetBreed>,
    #[serde(default)]
    pub interactions: Vec<PetInteraction>,
    #[serde(default)]
    pub personalities: Vec<PetPersonality>,
    #[serde(default)]
    pub reactivities: Vec<PetReactivity>,
    #[serde(default)]
    pub is_sterilized: bool,
}

impl PetAttributes {
    /// The same attributes with every list in vocabulary order, which is the
    /// order storage reads them back in.
    pub fn normalized(mut self) -> Self {
        self.aggression_levels.sort_unstable();
        self.allergies.sort_unstable();
        self.behaviors.sort_unstable();
        self.breeds.sort_unstable();
        self.interactions.sort_unstable();
        self.personalities.sort_unstable();
        self.reactivities.sort_unstable();
        self
    }
}

/// Request body for `POST /api/v1/pets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePetRequest {
    pub name: String,
    /// Birthday (`YYYY-MM-DD`).
    #[schema(value_type = String, format = Date, example = "2024-02-29")]
    pub birthday: NaiveDate,
    pub photo_url: String,
    pub gender: Gender,
    pub size: PetSize,
    /// Exact decimal weight, sent and returned as a string (e.g. `"12.50"`).
    #[schema(value_type = String, example = "12.50")]
    pub weight: Decimal,
    #[serde(default)]
    pub attributes: PetAttributes,
    #[serde(flatten)]
    pub link: UserPetLink,
}

impl CreatePetRequest {
    /// Checks the fields serde cannot express: the name width and the weight
    /// range and precision.
    pub fn validate(&self) -> Result<(), String> {
        check_len("Name", &self.name, MAX_NAME_LEN)?;
        check_weight(self.weight)
    }
}

/// Request body for `PATCH /api/v1/pets/{id}`. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePetRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date, example = "2024-02-29")]
    pub birthday: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<PetSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "12.50")]
    pub weight: Option<Decimal>,
}

impl UpdatePetRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            check_len("Name", name, MAX_NAME_LEN)?;
        }
        if let Some(weight) = self.weight {
            check_weight(weight)?;
        }
        Ok(())
    }
}

/// Request body for `PATCH /api/v1/pets/attributes/{id}`.
///
/// A present list replaces every stored value of its category (an empty list
/// clears it). Absent lists are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePetAttributesRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggression_levels: Option<Vec<PetAggressionLevel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<PetAllergy>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behaviors: Option<Vec<PetBehavior>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breeds: Option<Vec<PetBreed>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactions: Option<Vec<PetInteraction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalities: Option<Vec<PetPersonality>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactivities: Option<Vec<PetReactivity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_sterilized: Option<bool>,
}

/// Fully composed pet: base fields, attributes and the caller's link flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PetResponse {
    #[serde(rename = "petID")]
    pub pet_id: Uuid,
    #[serde(flatten)]
    pub pet: CreatePetRequest,
}

/// Generic `{"message": ...}` body used for confirmations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_pet() -> CreatePetRequest {
        CreatePetRequest {
            name: "Toby".into(),
            birthday: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            photo_url: "https://cdn.example.com/toby.png".into(),
            gender: Gender::Male,
            size: PetSize::Medium,
            weight: Decimal::from_str("12.50").unwrap(),
            attributes: PetAttributes::default(),
            link: UserPetLink {
                is_dog_owner: true,
                is_dog_sitter: false,
            },
        }
    }

    #[test]
    fn vocabulary_labels_match_wire_format() {
        assert_eq!(
            serde_json::to_string(&PetInteraction::GoodWithOtherPets).unwrap(),
            r#""Good with cats/other pets""#
        );
        assert_eq!(
            serde_json::from_str::<PetAllergy>(r#""None""#).unwrap(),
            PetAllergy::NoAllergy
        );
        assert_eq!(Gender::Female.to_string(), "female");
        assert_eq!(PetAggressionLevel::ALL.len(), 4);
        assert_eq!(PetAllergy::ALL.len(), 21);
    }

    #[test]
    fn unknown_vocabulary_value_is_rejected() {
        assert!(serde_json::from_str::<Gender>(r#""Male""#).is_err());
        assert!(serde_json::from_str::<PetSize>(r#""huge""#).is_err());
    }

    #[test]
    fn user_request_uses_camel_case_and_defaults() {
        let body = r#"{
            "name": "Ana",
            "gender": "female",
            "timezone": "Europe/Madrid",
            "subscription": {"subscriptionType": "active", "trialStartDate": "2025-01-01"}
        }"#;
        let request: CreateUserRequest = serde_json::from_str(body).unwrap();
        assert!(!request.has_onboarded);
        assert_eq!(request.notifications, Notifications::default());
        assert_eq!(
            request.subscription.trial_start_date,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
    }

    #[test]
    fn user_response_flattens_request_fields() {
        let body = r#"{
            "name": "Ana",
            "gender": "female",
            "hasOnboarded": true,
            "timezone": "Europe/Madrid",
            "subscription": {"subscriptionType": "active", "isTrialMode": false, "trialStartDate": "2025-01-01"}
        }"#;
        let response = UserResponse {
            external_id: "ext_123".into(),
            user: serde_json::from_str(body).unwrap(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["externalID"], "ext_123");
        assert_eq!(json["hasOnboarded"], true);
        assert_eq!(json["subscription"]["trialStartDate"], "2025-01-01");
    }

    #[test]
    fn pet_weight_and_birthday_keep_their_exact_text() {
        let json = serde_json::to_value(sample_pet()).unwrap();
        assert_eq!(json["weight"], "12.50");
        assert_eq!(json["birthday"], "2024-02-29");
        assert_eq!(json["isDogOwner"], true);
    }

    #[test]
    fn invalid_dates_are_rejected() {
        let body = r#"{"subscriptionType": "active", "trialStartDate": "2025-02-29"}"#;
        assert!(serde_json::from_str::<Subscription>(body).is_err());
    }

    #[test]
    fn validate_rejects_bad_weights() {
        let mut pet = sample_pet();
        assert!(pet.validate().is_ok());

        pet.weight = Decimal::from_str("-1.00").unwrap();
        assert!(pet.validate().is_err());

        pet.weight = Decimal::from_str("1.234").unwrap();
        assert!(pet.validate().is_err());

        pet.weight = Decimal::from_str("1000").unwrap();
        assert!(pet.validate().is_err());

        pet.weight = Decimal::from_str("999.99").unwrap();
        assert!(pet.validate().is_ok());
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() {
        let mut pet = sample_pet();
        pet.weight = Decimal::from_str("12.500").unwrap();
        assert!(pet.validate().is_ok());

        pet.weight = Decimal::from_str("12.505").unwrap();
        assert!(pet.validate().is_err());
    }

    #[test]
    fn names_longer_than_the_column_are_rejected() {
        let mut pet = sample_pet();
        pet.name = "x".repeat(MAX_NAME_LEN);
        assert!(pet.validate().is_ok());
        pet.name.push('x');
        assert_eq!(
            pet.validate().unwrap_err(),
            "Name must be at most 255 characters."
        );

        let mut user = CreateUserRequest {
            name: "Ana".into(),
            gender: Gender::Female,
            has_onboarded: false,
            timezone: "Europe/Madrid".into(),
            notifications: Notifications::default(),
            subscription: Subscription {
                subscription_type: SubscriptionType::Active,
                is_trial_mode: false,
                trial_start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            },
        };
        assert!(user.validate().is_ok());
        user.timezone = "z".repeat(MAX_TIMEZONE_LEN + 1);
        assert!(user.validate().is_err());

        // Multi-byte characters count once.
        user.timezone = "é".repeat(MAX_TIMEZONE_LEN);
        assert!(user.validate().is_ok());

        assert!(validate_external_id(&"e".repeat(MAX_EXTERNAL_ID_LEN)).is_ok());
        assert!(validate_external_id(&"e".repeat(MAX_EXTERNAL_ID_LEN + 1)).is_err());
    }

    #[test]
    fn partial_updates_validate_only_present_fields() {
        assert!(UpdateUserRequest::default().validate().is_ok());
        let update = UpdateUserRequest {
            name: Some("n".repeat(300)),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update: UpdatePetRequest = serde_json::from_str(r#"{"weight": "-2"}"#).unwrap();
        assert!(update.validate().is_err());
        let update: UpdatePetRequest = serde_json::from_str(r#"{"size": "large"}"#).unwrap();
        assert_eq!(update.size, Some(PetSize::Large));
        assert!(update.validate().is_ok());
    }

    #[test]
    fn attribute_update_tells_absent_from_empty() {
        let update: UpdatePetAttributesRequest =
            serde_json::from_str(r#"{"allergies": [], "breeds": ["Pug"]}"#).unwrap();
        assert_eq!(update.allergies, Some(vec![]));
        assert_eq!(update.breeds, Some(vec![PetBreed::Pug]));
        assert_eq!(update.behaviors, None);
        assert_eq!(update.is_sterilized, None);
    }

    #[test]
    fn normalized_attributes_follow_vocabulary_order() {
        let attributes = PetAttributes {
            allergies: vec![PetAllergy::Wheat, PetAllergy::Beef, PetAllergy::Wheat],
            breeds: vec![PetBreed::Pug, PetBreed::MixedBreed],
            is_sterilized: true,
            ..Default::default()
        }
        .normalized();
        assert_eq!(
            attributes.allergies,
            vec![PetAllergy::Beef, PetAllergy::Wheat, PetAllergy::Wheat]
        );
        assert_eq!(attributes.breeds, vec![PetBreed::MixedBreed, PetBreed::Pug]);
        assert!(attributes.is_sterilized);
    }
}
