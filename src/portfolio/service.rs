//! Portfolio reads and submissions over a [`DocumentStore`].

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::http::response::ApiError;
use crate::security::ClientKey;
use crate::store::{filter, Document, DocumentStore, Filter, SortSpec, StoreError};

use super::models::{
    Certificate, Contact, ContactRequest, Profile, Project, Question, QuestionRequest, Skill,
};

pub const PROFILES: &str = "profiles";
pub const SKILLS: &str = "skills";
pub const PROJECTS: &str = "projects";
pub const CERTIFICATES: &str = "certificates";
pub const CONTACTS: &str = "contacts";
pub const QUESTIONS: &str = "questions";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("profile not found")]
    ProfileNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::ProfileNotFound => ApiError::not_found("profile not found"),
            ServiceError::Store(e) => {
                tracing::error!(error = %e, "Store operation failed");
                ApiError::internal()
            }
        }
    }
}

#[derive(Clone)]
pub struct PortfolioService {
    store: Arc<dyn DocumentStore>,
}

impl PortfolioService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn profile(&self, profile_id: &str) -> Result<Profile, ServiceError> {
        match self
            .store
            .find_one(PROFILES, &filter([("id", json!(profile_id))]))
            .await
        {
            Ok(doc) => Ok(decode(doc)?),
            Err(StoreError::NotFound) => Err(ServiceError::ProfileNotFound),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn skills(&self, profile_id: &str) -> Result<Vec<Skill>, ServiceError> {
        self.ensure_profile(profile_id).await?;
        self.list(
            SKILLS,
            filter([("profileId", json!(profile_id))]),
            &["category", "name", "proficiency"],
        )
        .await
    }

    /// Visible projects only, newest first.
    pub async fn projects(&self, profile_id: &str) -> Result<Vec<Project>, ServiceError> {
        self.ensure_profile(profile_id).await?;
        self.list(
            PROJECTS,
            filter([("profileId", json!(profile_id)), ("visible", json!(true))]),
            &["-createdAt"],
        )
        .await
    }

    pub async fn certificates(&self, profile_id: &str) -> Result<Vec<Certificate>, ServiceError> {
        self.ensure_profile(profile_id).await?;
        self.list(
            CERTIFICATES,
            filter([("profileId", json!(profile_id))]),
            &["name"],
        )
        .await
    }

    /// Store a contact message. The request must already be sanitised and
    /// validated.
    pub async fn create_contact(
        &self,
        profile_id: &str,
        request: ContactRequest,
    ) -> Result<Contact, ServiceError> {
        self.ensure_profile(profile_id).await?;

        let contact = Contact {
            id: Uuid::new_v4().to_string(),
            profile_id: profile_id.to_string(),
            name: request.name,
            email: request.email,
            message: request.message,
            contacted: false,
            contacted_at: None,
            created_at: Utc::now(),
        };
        self.store.insert_one(CONTACTS, encode(&contact)?).await?;
        tracing::info!(profile_id, contact_id = %contact.id, "Contact message stored");
        Ok(contact)
    }

    pub async fn create_question(
        &self,
        profile_id: &str,
        request: QuestionRequest,
        client: &ClientKey,
    ) -> Result<Question, ServiceError> {
        self.ensure_profile(profile_id).await?;

        let question = Question {
            id: Uuid::new_v4().to_string(),
            profile_id: profile_id.to_string(),
            message: request.message,
            ip: client.to_string(),
            created_at: Utc::now(),
        };
        self.store.insert_one(QUESTIONS, encode(&question)?).await?;
        tracing::info!(profile_id, question_id = %question.id, "Question stored");
        Ok(question)
    }

    async fn ensure_profile(&self, profile_id: &str) -> Result<(), ServiceError> {
        let found = self
            .store
            .count(PROFILES, &filter([("id", json!(profile_id))]))
            .await?;
        if found == 0 {
            return Err(ServiceError::ProfileNotFound);
        }
        Ok(())
    }

    async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: Filter,
        sort: &[&str],
    ) -> Result<Vec<T>, ServiceError> {
        let docs = self
            .store
            .find_many(collection, &filter, &SortSpec::parse(sort))
            .await?;
        Ok(docs.into_iter().map(decode).collect::<Result<Vec<T>, _>>()?)
    }
}

fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(doc)?)
}

fn encode<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    Ok(serde_json::to_value(value)?)
}
