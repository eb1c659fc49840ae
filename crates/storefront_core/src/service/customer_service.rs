//! Customer use-case service.
//!
//! # Invariants
//! - Emails are stored in normalized form (trimmed, lowercase).
//! - Email addresses and passwords never appear in log lines.

use crate::model::customer::{normalize_email, Customer, CustomerId};
use crate::model::ModelValidationError;
use crate::repo::customer_repo::CustomerRepository;
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const EMAIL_UNIQUE_VIOLATION: &str = "UNIQUE constraint failed: customer.email";

/// Registration input for a new customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterCustomerRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub enum CustomerServiceError {
    /// Input failed model validation.
    Invalid(ModelValidationError),
    /// Another customer already uses the email.
    EmailAlreadyRegistered,
    Repo(RepoError),
}

impl Display for CustomerServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::EmailAlreadyRegistered => write!(f, "email is already registered"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CustomerServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::EmailAlreadyRegistered => None,
        }
    }
}

impl From<RepoError> for CustomerServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Invalid(err),
            other => Self::Repo(other),
        }
    }
}

pub struct CustomerService<R: CustomerRepository> {
    repo: R,
}

impl<R: CustomerRepository> CustomerService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a customer and returns the stored record.
    pub fn register(
        &self,
        request: &RegisterCustomerRequest,
    ) -> Result<Customer, CustomerServiceError> {
        let email = normalize_email(&request.email);
        let customer = Customer::new(
            request.first_name.trim(),
            request.last_name.trim(),
            email,
            request.password.as_str(),
        );
        customer.validate().map_err(CustomerServiceError::Invalid)?;

        if self.repo.find_by_email(&customer.email)?.is_some() {
            warn!("event=customer_register module=service status=rejected reason=duplicate_email");
            return Err(CustomerServiceError::EmailAlreadyRegistered);
        }

        match self.repo.create_customer(&customer) {
            Ok(_) => {}
            // A concurrent registration can win between lookup and insert.
            Err(RepoError::ConstraintViolation(message))
                if message.contains(EMAIL_UNIQUE_VIOLATION) =>
            {
                warn!(
                    "event=customer_register module=service status=rejected reason=duplicate_email_on_insert"
                );
                return Err(CustomerServiceError::EmailAlreadyRegistered);
            }
            Err(err) => return Err(err.into()),
        }
        info!(
            "event=customer_register module=service status=ok customer_id={}",
            customer.customer_id
        );
        Ok(customer)
    }

    pub fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        self.repo.get_customer(id)
    }

    pub fn find_by_email(&self, email: &str) -> RepoResult<Option<Customer>> {
        self.repo.find_by_email(email)
    }

    pub fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        self.repo.list_customers()
    }
}
