// crates/network/src/api.rs
//! Backend endpoints

use crate::client::{ApiClient, Auth};
use crate::error::{NetworkError, NetworkResult};
use crate::session::Session;
use crate::types::{FavoriteRecord, StatusUpdate};
use crate::wire;
use museu_core::{Author, AuthorId, Book, BookId, Genre, RankedBook, ReadingStatus};
use reqwest::Method;
use serde_json::json;

impl ApiClient {
    /// `POST /auth/login`; stores the returned session
    pub async fn login(&self, email: &str, password: &str) -> NetworkResult<Session> {
        let url = self.endpoint(&["auth", "login"])?;
        let body = json!({ "email": email.trim(), "senha": password });

        let response = self.send(Method::POST, url, Some(body), Auth::Anonymous).await?;
        let session = wire::session(response)?;
        self.session_store().save(&session)?;

        log::info!("Signed in as {}", session.display_name());
        Ok(session)
    }

    /// `POST /auth/register`
    ///
    /// Returns the new session when the backend signs the reader in directly,
    /// `None` when a separate login is needed.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> NetworkResult<Option<Session>> {
        let url = self.endpoint(&["auth", "register"])?;
        let body = json!({ "nome": name.trim(), "email": email.trim(), "senha": password });

        let response = self.send(Method::POST, url, Some(body), Auth::Anonymous).await?;
        match wire::session(response) {
            Ok(session) => {
                self.session_store().save(&session)?;
                log::info!("Registered and signed in as {}", session.display_name());
                Ok(Some(session))
            }
            Err(_) => {
                log::info!("Registered {}", email.trim());
                Ok(None)
            }
        }
    }

    /// Forgets the stored session
    pub fn logout(&self) -> NetworkResult<()> {
        if let Some(session) = self.session_store().clear()? {
            log::info!("Signed out {}", session.display_name());
        }
        Ok(())
    }

    /// `GET /livros/{id}`
    pub async fn book(&self, id: &BookId) -> NetworkResult<Book> {
        let url = self.endpoint(&["livros", id.as_str()])?;
        wire::book(self.get(url, Auth::Optional).await?)
    }

    /// `GET /livros/por-genero?genero=`
    pub async fn books_by_genre(&self, genre: &str) -> NetworkResult<Vec<Book>> {
        let mut url = self.endpoint(&["livros", "por-genero"])?;
        url.query_pairs_mut().append_pair("genero", genre.trim());
        wire::books(self.get(url, Auth::Optional).await?)
    }

    /// `GET /livros/generos`
    pub async fn genres(&self) -> NetworkResult<Vec<Genre>> {
        let url = self.endpoint(&["livros", "generos"])?;
        wire::genres(self.get(url, Auth::Optional).await?)
    }

    /// `GET /livros/ranking`
    pub async fn ranking(&self) -> NetworkResult<Vec<RankedBook>> {
        let url = self.endpoint(&["livros", "ranking"])?;
        wire::ranking(self.get(url, Auth::Optional).await?)
    }

    /// `GET /escritores`
    pub async fn authors(&self) -> NetworkResult<Vec<Author>> {
        let url = self.endpoint(&["escritores"])?;
        wire::authors(self.get(url, Auth::Optional).await?)
    }

    /// `GET /escritores/{id}`
    pub async fn author(&self, id: &AuthorId) -> NetworkResult<Author> {
        let url = self.endpoint(&["escritores", id.as_str()])?;
        wire::author(self.get(url, Auth::Optional).await?)
    }

    /// `POST /escritores/{id}/seguir`
    pub async fn follow_author(&self, id: &AuthorId) -> NetworkResult<()> {
        let url = self.endpoint(&["escritores", id.as_str(), "seguir"])?;
        self.send(Method::POST, url, None, Auth::Required).await?;
        log::info!("Following author {}", id);
        Ok(())
    }

    /// `DELETE /escritores/{id}/seguir`
    pub async fn unfollow_author(&self, id: &AuthorId) -> NetworkResult<()> {
        let url = self.endpoint(&["escritores", id.as_str(), "seguir"])?;
        self.send(Method::DELETE, url, None, Auth::Required).await?;
        log::info!("Stopped following author {}", id);
        Ok(())
    }

    /// `GET /favoritos`
    pub async fn favorites(&self) -> NetworkResult<Vec<FavoriteRecord>> {
        let url = self.endpoint(&["favoritos"])?;
        wire::favorites(self.get(url, Auth::Required).await?)
    }

    /// `POST /favoritos {livroId, status}`
    pub async fn add_favorite(&self, id: &BookId, status: ReadingStatus) -> NetworkResult<()> {
        let url = self.endpoint(&["favoritos"])?;
        let body = json!({ "livroId": id.to_json_value(), "status": status.as_wire_str() });
        self.send(Method::POST, url, Some(body), Auth::Required).await?;
        Ok(())
    }

    /// `DELETE /favoritos/{livroId}`
    pub async fn remove_favorite(&self, id: &BookId) -> NetworkResult<()> {
        let url = self.endpoint(&["favoritos", id.as_str()])?;
        self.send(Method::DELETE, url, None, Auth::Required).await?;
        Ok(())
    }

    /// `PATCH /favoritos/status/{livroId} {statusLeitura, progresso, dataInicio}`
    pub async fn update_reading_status(
        &self,
        id: &BookId,
        update: &StatusUpdate,
    ) -> NetworkResult<()> {
        let url = self.endpoint(&["favoritos", "status", id.as_str()])?;
        let body = serde_json::to_value(update)
            .map_err(|e| NetworkError::Decode(e.to_string()))?;
        self.send(Method::PATCH, url, Some(body), Auth::Required).await?;
        Ok(())
    }
}
