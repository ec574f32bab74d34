// crates/network/src/wire.rs
//! Response normalization
//!
//! The backend has answered the same endpoint with several JSON shapes over
//! time: bare arrays, `{data: [...]}`, paged `{content: [...]}`, named wrappers
//! such as `{favoritos: [...]}`, numeric or string ids, Portuguese or English
//! field names, and favorites with the book nested under `livro`. Everything is
//! decoded here into the `museu_core` types so nothing past the client ever
//! branches on response shape.

use crate::error::{NetworkError, NetworkResult};
use crate::session::Session;
use crate::types::FavoriteRecord;
use chrono::NaiveDate;
use museu_core::{
    Author, AuthorId, Book, BookId, Genre, RankedBook, ReadingStatus, User, Validator,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

const LIST_KEYS: [&str; 3] = ["data", "content", "items"];
const MESSAGE_KEYS: [&str; 5] = ["message", "mensagem", "error", "erro", "detail"];

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

/// A name given either as a plain string or as an `{id, nome}` object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNameRef {
    Plain(String),
    Object {
        #[serde(default)]
        id: Option<RawId>,
        #[serde(alias = "nome")]
        name: String,
    },
}

#[derive(Debug, Deserialize)]
struct RawBook {
    #[serde(alias = "livroId", alias = "idLivro")]
    id: RawId,
    #[serde(alias = "titulo")]
    title: String,
    #[serde(default, alias = "autor", alias = "escritor")]
    author: Option<RawNameRef>,
    #[serde(default, rename = "authorName", alias = "nomeAutor")]
    author_name: Option<String>,
    #[serde(default, rename = "authorId", alias = "autorId", alias = "escritorId")]
    author_id: Option<RawId>,
    #[serde(default, alias = "genero")]
    genre: Option<RawNameRef>,
    #[serde(default, rename = "publishedYear", alias = "anoPublicacao", alias = "ano")]
    published_year: Option<i32>,
    #[serde(default, alias = "sinopse", alias = "descricao")]
    synopsis: Option<String>,
    #[serde(default, rename = "coverUrl", alias = "capaUrl", alias = "imagemUrl", alias = "capa")]
    cover_url: Option<String>,
    #[serde(
        default,
        rename = "averageRating",
        alias = "mediaAvaliacao",
        alias = "avaliacaoMedia"
    )]
    average_rating: Option<f32>,
    #[serde(default, rename = "pageCount", alias = "numeroPaginas", alias = "paginas")]
    page_count: Option<u32>,
}

impl From<RawBook> for Book {
    fn from(raw: RawBook) -> Self {
        let (author, nested_author_id) = match raw.author {
            Some(RawNameRef::Plain(name)) => (Some(name), None),
            Some(RawNameRef::Object { id, name }) => (Some(name), id),
            None => (None, None),
        };

        let mut book = Book::new(BookId::new(raw.id.into_string()), raw.title);
        book.author = author.or(raw.author_name);
        book.author_id = raw
            .author_id
            .or(nested_author_id)
            .map(|id| AuthorId::new(id.into_string()));
        book.genre = raw.genre.map(|g| match g {
            RawNameRef::Plain(name) | RawNameRef::Object { name, .. } => name,
        });
        book.published_year = raw.published_year;
        book.synopsis = raw.synopsis;
        book.cover_url = raw.cover_url.filter(|url| !url.trim().is_empty());
        book.average_rating = raw.average_rating;
        book.page_count = raw.page_count;
        book
    }
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    id: RawId,
    #[serde(alias = "nome")]
    name: String,
    #[serde(default, alias = "nacionalidade")]
    nationality: Option<String>,
    #[serde(default, alias = "biografia")]
    biography: Option<String>,
    #[serde(default, rename = "photoUrl", alias = "fotoUrl", alias = "foto", alias = "imagemUrl")]
    photo_url: Option<String>,
    #[serde(
        default,
        rename = "followerCount",
        alias = "totalSeguidores",
        alias = "seguidores"
    )]
    follower_count: Option<u64>,
    #[serde(default, alias = "seguindo")]
    followed: Option<bool>,
    #[serde(default, alias = "livros")]
    books: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawGenre {
    Name(String),
    Detailed {
        #[serde(alias = "nome", alias = "genero")]
        name: String,
        #[serde(default, rename = "bookCount", alias = "quantidade", alias = "totalLivros")]
        book_count: Option<u64>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct RawRankStats {
    #[serde(default, alias = "posicao")]
    position: Option<u32>,
    #[serde(
        default,
        rename = "favoriteCount",
        alias = "totalFavoritos",
        alias = "favoritos"
    )]
    favorite_count: Option<u64>,
    #[serde(default, alias = "pontuacao", alias = "nota")]
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawFavorite {
    #[serde(default, rename = "livroId", alias = "bookId")]
    book_id: Option<RawId>,
    #[serde(default, alias = "livro")]
    book: Option<Value>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "statusLeitura")]
    reading_status: Option<String>,
    #[serde(default, alias = "progresso")]
    progress: Option<f64>,
    #[serde(default, rename = "dataInicio", alias = "startedOn")]
    started_on: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: RawId,
    #[serde(alias = "nome")]
    name: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct RawAuth {
    #[serde(alias = "accessToken", alias = "jwt")]
    token: String,
    #[serde(default, alias = "usuario")]
    user: Option<RawUser>,
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default, alias = "nome")]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> NetworkResult<T> {
    serde_json::from_value(value).map_err(|e| NetworkError::Decode(format!("{}: {}", what, e)))
}

/// Extracts the items of a list response
///
/// Accepts a bare array, an object wrapping the array under one of the
/// generic keys or one of `named`, and a paged object nested under `data`.
pub(crate) fn list_items(body: Value, named: &[&str]) -> NetworkResult<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        Value::Object(mut map) => {
            for key in LIST_KEYS.iter().chain(named.iter()) {
                if let Some(inner) = map.remove(*key) {
                    if inner.is_array() || inner.is_object() {
                        return list_items(inner, named);
                    }
                }
            }
            Err(NetworkError::Decode(format!(
                "expected a list, got an object with keys [{}]",
                map.keys().cloned().collect::<Vec<_>>().join(", ")
            )))
        }
        other => Err(NetworkError::Decode(format!(
            "expected a list, got {}",
            other
        ))),
    }
}

/// Unwraps `{data: {...}}` around a single entity
pub(crate) fn entity(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.len() == 1 && map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decodes every item, skipping (and logging) the ones that do not fit
fn decode_items<T, F>(items: Vec<Value>, what: &str, convert: F) -> Vec<T>
where
    F: Fn(Value) -> NetworkResult<T>,
{
    items
        .into_iter()
        .filter_map(|item| match convert(item) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Skipping {} entry: {}", what, e);
                None
            }
        })
        .collect()
}

/// Decodes one book; records without an id or title are refused
pub(crate) fn book(body: Value) -> NetworkResult<Book> {
    let book = Book::from(decode::<RawBook>(entity(body), "book")?);
    match book.validate() {
        Ok(()) => Ok(book),
        Err(errors) => Err(NetworkError::Decode(format!(
            "book {}: {}",
            book.id,
            errors.join("; ")
        ))),
    }
}

pub(crate) fn books(body: Value) -> NetworkResult<Vec<Book>> {
    let items = list_items(body, &["livros", "books"])?;
    Ok(decode_items(items, "book", book))
}

fn author_from(value: Value) -> NetworkResult<Author> {
    let raw: RawAuthor = decode(value, "author")?;

    let mut author = Author::new(AuthorId::new(raw.id.into_string()), raw.name);
    author.nationality = raw.nationality;
    author.biography = raw.biography;
    author.photo_url = raw.photo_url;
    author.follower_count = raw.follower_count;
    author.followed = raw.followed;
    author.books = decode_items(raw.books.unwrap_or_default(), "book", book);
    Ok(author)
}

pub(crate) fn author(body: Value) -> NetworkResult<Author> {
    author_from(entity(body))
}

pub(crate) fn authors(body: Value) -> NetworkResult<Vec<Author>> {
    let items = list_items(body, &["escritores", "autores", "authors"])?;
    Ok(decode_items(items, "author", author_from))
}

pub(crate) fn genres(body: Value) -> NetworkResult<Vec<Genre>> {
    let items = list_items(body, &["generos", "genres"])?;
    Ok(decode_items(items, "genre", |item| {
        Ok(match decode::<RawGenre>(item, "genre")? {
            RawGenre::Name(name) => Genre {
                name,
                book_count: None,
            },
            RawGenre::Detailed { name, book_count } => Genre { name, book_count },
        })
    }))
}

/// Ranking rows come either as `{posicao, livro: {...}, totalFavoritos}` or
/// as a book object carrying the ranking fields inline
pub(crate) fn ranking(body: Value) -> NetworkResult<Vec<RankedBook>> {
    let items = list_items(body, &["ranking", "livros"])?;

    let mut rows = Vec::with_capacity(items.len());
    for (index, mut item) in items.into_iter().enumerate() {
        let nested = item.as_object_mut().and_then(|map| map.remove("livro"));
        let stats: RawRankStats = decode(item.clone(), "ranking row").unwrap_or_default();
        let book_value = nested.unwrap_or(item);

        match book(book_value) {
            Ok(book) => rows.push(RankedBook {
                position: stats.position.unwrap_or(index as u32 + 1),
                book,
                favorite_count: stats.favorite_count,
                score: stats.score,
            }),
            Err(e) => log::warn!("Skipping ranking entry: {}", e),
        }
    }

    Ok(rows)
}

fn parse_status(raw: Option<String>) -> Option<ReadingStatus> {
    let raw = raw?;
    match raw.parse() {
        Ok(status) => Some(status),
        Err(e) => {
            log::debug!("Ignoring reading status: {}", e);
            None
        }
    }
}

fn parse_date(raw: Option<String>) -> Option<NaiveDate> {
    let raw = raw?;
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn favorite_from(value: Value) -> NetworkResult<FavoriteRecord> {
    let raw: RawFavorite = decode(value.clone(), "favorite")?;

    // Nested `livro`, or else the record itself is the book
    let book = match raw.book {
        Some(nested) => Some(book(nested)?),
        None if raw.book_id.is_none() => Some(book(value)?),
        None => None,
    };

    let book_id = match (raw.book_id, &book) {
        (Some(id), _) => BookId::new(id.into_string()),
        (None, Some(book)) => book.id.clone(),
        (None, None) => return Err(NetworkError::Decode("favorite without a book id".into())),
    };

    let reading_status = parse_status(raw.reading_status).or(parse_status(raw.status));
    let progress = match reading_status {
        Some(_) => raw.progress.unwrap_or(0.0).clamp(0.0, 100.0).round() as u8,
        None => 0,
    };

    Ok(FavoriteRecord {
        book_id,
        book,
        reading_status,
        progress,
        started_on: parse_date(raw.started_on),
    })
}

pub(crate) fn favorites(body: Value) -> NetworkResult<Vec<FavoriteRecord>> {
    let items = list_items(body, &["favoritos", "favorites"])?;
    Ok(decode_items(items, "favorite", favorite_from))
}

/// Builds a session from a login (or register) response
pub(crate) fn session(body: Value) -> NetworkResult<Session> {
    let raw: RawAuth = decode(entity(body), "auth response")?;

    let user = match raw.user {
        Some(user) => Some(User::new(user.id.into_string(), user.name, user.email)),
        None => match (raw.id, raw.name) {
            (Some(id), Some(name)) => Some(User::new(
                id.into_string(),
                name,
                raw.email.unwrap_or_default(),
            )),
            _ => None,
        },
    };

    Ok(Session::new(raw.token, user))
}

/// Human-readable message from an error body
pub(crate) fn error_message(body: &str) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in MESSAGE_KEYS {
            if let Some(Value::String(message)) = map.get(key) {
                if !message.trim().is_empty() {
                    return Some(message.trim().to_string());
                }
            }
        }
        return None;
    }

    let text = body.trim();
    if text.is_empty() || text.len() > 200 || text.starts_with('<') {
        None
    } else {
        Some(text.to_string())
    }
}

/// Whether a 401 body says the bearer token itself is bad
pub(crate) fn names_invalid_token(body: &str) -> bool {
    let body = body.to_lowercase();
    body.contains("token")
        && ["invalid", "inválid", "expired", "expirad"]
            .iter()
            .any(|word| body.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_shapes() {
        let expected = vec![json!(1), json!(2)];

        assert_eq!(list_items(json!([1, 2]), &[]).unwrap(), expected);
        assert_eq!(list_items(json!({"data": [1, 2]}), &[]).unwrap(), expected);
        assert_eq!(
            list_items(json!({"content": [1, 2], "totalPages": 1}), &[]).unwrap(),
            expected
        );
        assert_eq!(
            list_items(json!({"favoritos": [1, 2]}), &["favoritos"]).unwrap(),
            expected
        );
        assert_eq!(
            list_items(json!({"data": {"content": [1, 2]}}), &[]).unwrap(),
            expected
        );
        assert!(list_items(json!(null), &[]).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_list_shape_is_an_error() {
        let err = list_items(json!({"total": 3}), &[]).unwrap_err();
        assert!(matches!(err, NetworkError::Decode(msg) if msg.contains("total")));
    }

    #[test]
    fn test_book_portuguese_fields() {
        let book = book(json!({
            "id": 42,
            "titulo": "Dom Casmurro",
            "autor": {"id": 7, "nome": "Machado de Assis"},
            "genero": "Romance",
            "anoPublicacao": 1899,
            "capaUrl": ""
        }))
        .unwrap();

        assert_eq!(book.id, BookId::from(42u64));
        assert_eq!(book.title, "Dom Casmurro");
        assert_eq!(book.author.as_deref(), Some("Machado de Assis"));
        assert_eq!(book.author_id, Some(AuthorId::from(7u64)));
        assert_eq!(book.genre.as_deref(), Some("Romance"));
        assert_eq!(book.published_year, Some(1899));
        assert_eq!(book.cover_url, None);
    }

    #[test]
    fn test_book_wrapped_in_data_with_string_id() {
        let book = book(json!({"data": {"id": "42", "title": "Iracema", "autor": "José de Alencar"}}))
            .unwrap();
        assert_eq!(book.id.as_str(), "42");
        assert_eq!(book.author.as_deref(), Some("José de Alencar"));
    }

    #[test]
    fn test_invalid_books_refused_or_skipped() {
        let err = book(json!({"id": 4, "titulo": "  "})).unwrap_err();
        assert!(matches!(err, NetworkError::Decode(msg) if msg.contains("Title")));

        let listed = books(json!({"livros": [
            {"id": "", "titulo": "Sem id"},
            {"id": 5, "titulo": "O Cortiço", "mediaAvaliacao": 9.5},
            {"id": 6, "titulo": "Triste Fim de Policarpo Quaresma", "mediaAvaliacao": 4.1}
        ]}))
        .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id.as_str(), "6");
    }

    #[test]
    fn test_favorite_nested_book() {
        let records = favorites(json!([{
            "id": 900,
            "livro": {"id": 42, "titulo": "Dom Casmurro"},
            "statusLeitura": "LENDO",
            "progresso": 37.6,
            "dataInicio": "2026-09-30T12:00:00"
        }]))
        .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.book_id, BookId::from(42u64));
        assert_eq!(record.reading_status, Some(ReadingStatus::Reading));
        assert_eq!(record.progress, 38);
        assert_eq!(record.started_on, NaiveDate::from_ymd_opt(2026, 9, 30));
        assert_eq!(record.title(), "Dom Casmurro");
    }

    #[test]
    fn test_favorite_flat_with_livro_id() {
        let records = favorites(json!({"data": [
            {"livroId": "5", "status": "WANT_TO_READ", "progresso": 80},
            {"livroId": 6, "status": null}
        ]}))
        .unwrap();

        assert_eq!(records[0].book_id.as_str(), "5");
        assert_eq!(records[0].reading_status, Some(ReadingStatus::WantToRead));
        assert_eq!(records[0].progress, 80);
        assert_eq!(records[1].reading_status, None);
        assert_eq!(records[1].progress, 0);
    }

    #[test]
    fn test_favorite_as_bare_book_and_bad_rows_skipped() {
        let records = favorites(json!({"favoritos": [
            {"id": 3, "titulo": "Vidas Secas", "statusLeitura": "LIDO"},
            {"statusLeitura": "LIDO"}
        ]}))
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].book_id.as_str(), "3");
        assert_eq!(records[0].reading_status, Some(ReadingStatus::Finished));
    }

    #[test]
    fn test_genres_strings_or_objects() {
        let genres = genres(json!(["Romance", {"nome": "Poesia", "quantidade": 12}])).unwrap();
        assert_eq!(genres[0].name, "Romance");
        assert_eq!(genres[1].name, "Poesia");
        assert_eq!(genres[1].book_count, Some(12));
    }

    #[test]
    fn test_ranking_nested_and_inline() {
        let rows = ranking(json!([
            {"posicao": 1, "livro": {"id": 1, "titulo": "A"}, "totalFavoritos": 30},
            {"id": 2, "titulo": "B", "pontuacao": 4.5}
        ]))
        .unwrap();

        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[0].favorite_count, Some(30));
        assert_eq!(rows[1].position, 2);
        assert_eq!(rows[1].book.title, "B");
        assert_eq!(rows[1].score, Some(4.5));
    }

    #[test]
    fn test_author_with_books() {
        let author = author(json!({
            "id": "7",
            "nome": "Machado de Assis",
            "nacionalidade": "Brasileira",
            "seguindo": true,
            "livros": [{"id": 42, "titulo": "Dom Casmurro"}, {"titulo": "sem id"}]
        }))
        .unwrap();

        assert_eq!(author.id.as_str(), "7");
        assert_eq!(author.followed, Some(true));
        assert_eq!(author.books.len(), 1);
    }

    #[test]
    fn test_session_shapes() {
        let nested = session(json!({
            "token": "jwt-1",
            "usuario": {"id": 3, "nome": "Cecília Meireles", "email": "c@m.br"}
        }))
        .unwrap();
        assert_eq!(nested.token, "jwt-1");
        assert_eq!(nested.user.unwrap().name, "Cecília Meireles");

        let flat = session(json!({"accessToken": "jwt-2", "id": "9", "nome": "Rui"})).unwrap();
        assert_eq!(flat.user.unwrap().id, "9");

        let bare = session(json!({"token": "jwt-3"})).unwrap();
        assert!(bare.user.is_none());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"mensagem": "Livro já favoritado"}"#).as_deref(),
            Some("Livro já favoritado")
        );
        assert_eq!(error_message("Bad thing").as_deref(), Some("Bad thing"));
        assert_eq!(error_message("<html>oops</html>"), None);
        assert_eq!(error_message(""), None);
    }

    #[test]
    fn test_invalid_token_detection() {
        assert!(names_invalid_token(r#"{"error": "Token inválido"}"#));
        assert!(names_invalid_token(r#"{"message": "JWT token expired"}"#));
        assert!(!names_invalid_token(r#"{"message": "Senha incorreta"}"#));
    }
}
