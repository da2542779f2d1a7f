//! UserRepository - Repository per i record di presenza degli utenti

use super::{Create, Read, ReadMany};
use crate::dtos::{CreateUserDTO, UpdateProfileDTO};
use crate::entities::User;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{Error, MySqlPool, QueryBuilder};

const USER_COLUMNS: &str = "user_id, username, password, name, avatar_url, university, degree, \
     year, bio, subjects, interests, lat, lng, is_online, is_premium, last_seen";

// USER REPO
pub struct UserRepository {
    connection_pool: MySqlPool,
}

impl UserRepository {
    pub fn new(connection_pool: MySqlPool) -> UserRepository {
        Self { connection_pool }
    }

    ///considero l'username univoco
    /// Find user by exact username match
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }

    /// Search users by partial name match (for search functionality)
    pub async fn search_by_name_partial(&self, name_pattern: &str) -> Result<Vec<User>, Error> {
        let pattern = format!("{}%", name_pattern);
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE name LIKE ? LIMIT 10"
        ))
        .bind(pattern)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(users)
    }

    /// Snapshot di tutti gli utenti online: è il re-fetch completo che un
    /// client esegue dopo una riconnessione, prima di riprendere gli
    /// aggiornamenti incrementali.
    pub async fn find_all_online(&self) -> Result<Vec<User>, Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_online = TRUE"
        ))
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(users)
    }

    /// Scrive la posizione dell'utente. Per costruzione viene chiamata solo
    /// con l'id dell'utente autenticato: la riga ha un solo writer.
    pub async fn update_location(&self, user_id: &i32, lat: f64, lng: f64) -> Result<(), Error> {
        sqlx::query("UPDATE users SET lat = ?, lng = ?, last_seen = ? WHERE user_id = ?")
            .bind(lat)
            .bind(lng)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }

    /// Heartbeat di liveness: tocca last_seen senza toccare la posizione.
    pub async fn touch_last_seen(&self, user_id: &i32) -> Result<(), Error> {
        sqlx::query("UPDATE users SET last_seen = ?, is_online = TRUE WHERE user_id = ?")
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }

    pub async fn set_online(&self, user_id: &i32, online: bool) -> Result<(), Error> {
        sqlx::query("UPDATE users SET is_online = ?, last_seen = ? WHERE user_id = ?")
            .bind(online)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }

    /// Aggiorna i soli campi Some del profilo, poi rilegge la riga.
    pub async fn update_profile(
        &self,
        user_id: &i32,
        data: &UpdateProfileDTO,
    ) -> Result<User, Error> {
        let current = self
            .read(user_id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)?;

        // Build dynamic UPDATE query using QueryBuilder (idiomatic SQLx way)
        let mut query_builder = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query_builder.separated(", ");
        let mut any_field = false;

        if let Some(ref name) = data.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
            any_field = true;
        }
        if let Some(ref avatar_url) = data.avatar_url {
            separated.push("avatar_url = ");
            separated.push_bind_unseparated(avatar_url);
            any_field = true;
        }
        if let Some(ref degree) = data.degree {
            separated.push("degree = ");
            separated.push_bind_unseparated(degree);
            any_field = true;
        }
        if let Some(year) = data.year {
            separated.push("year = ");
            separated.push_bind_unseparated(year);
            any_field = true;
        }
        if let Some(ref bio) = data.bio {
            separated.push("bio = ");
            separated.push_bind_unseparated(bio);
            any_field = true;
        }
        if let Some(ref subjects) = data.subjects {
            separated.push("subjects = ");
            separated.push_bind_unseparated(Json(subjects.clone()));
            any_field = true;
        }
        if let Some(ref interests) = data.interests {
            separated.push("interests = ");
            separated.push_bind_unseparated(Json(interests.clone()));
            any_field = true;
        }

        if !any_field {
            return Ok(current);
        }

        query_builder.push(" WHERE user_id = ");
        query_builder.push_bind(user_id);

        query_builder.build().execute(&self.connection_pool).await?;

        self.read(user_id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)
    }

    /// Entitlement premium: scritto dal provider di pagamento esterno,
    /// letto una volta per ogni reveal di profilo.
    pub async fn set_premium(&self, user_id: &i32, premium: bool) -> Result<(), Error> {
        sqlx::query("UPDATE users SET is_premium = ? WHERE user_id = ?")
            .bind(premium)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    /// Il DTO arriva qui con la password già hashata dal service.
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        let now = Utc::now();
        let subjects: Json<Vec<String>> = Json(Vec::new());
        let interests: Json<Vec<String>> = Json(Vec::new());

        let result = sqlx::query(
            "INSERT INTO users (username, password, name, avatar_url, university, degree, year, \
             bio, subjects, interests, lat, lng, is_online, is_premium, last_seen) \
             VALUES (?, ?, ?, '', ?, ?, ?, ?, ?, ?, 0, 0, FALSE, FALSE, ?)",
        )
        .bind(&data.username)
        .bind(&data.password)
        .bind(&data.name)
        .bind(data.university)
        .bind(&data.degree)
        .bind(data.year)
        .bind(&data.bio)
        .bind(subjects.clone())
        .bind(interests.clone())
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;

        Ok(User {
            user_id: new_id,
            username: data.username.clone(),
            password: data.password.clone(),
            name: data.name.clone(),
            avatar_url: String::new(),
            university: data.university,
            degree: data.degree.clone(),
            year: data.year,
            bio: data.bio.clone(),
            subjects,
            interests,
            lat: 0.0,
            lng: 0.0,
            is_online: false,
            is_premium: false,
            last_seen: now,
        })
    }
}

impl Read<User, i32> for UserRepository {
    async fn read(&self, id: &i32) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }
}

impl ReadMany<User, i32> for UserRepository {
    async fn read_many(&self, ids: &[i32]) -> Result<Vec<User>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE user_id IN ("));
        let mut separated = query_builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        query_builder.push(")");

        let users = query_builder
            .build_query_as::<User>()
            .fetch_all(&self.connection_pool)
            .await?;

        Ok(users)
    }
}
