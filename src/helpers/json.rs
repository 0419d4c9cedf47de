use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::Serialize;

/// Envelope of every successful response.
#[derive(Debug, Serialize)]
pub struct JsonResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

pub struct JsonResponseBuilder<T> {
    item: Option<T>,
    list: Option<Vec<T>>,
    token: Option<String>,
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    pub fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder {
            item: None,
            list: None,
            token: None,
        }
    }
}

impl<T> JsonResponseBuilder<T>
where
    T: Serialize,
{
    pub fn set_item(mut self, item: T) -> Self {
        self.item = Some(item);
        self
    }

    pub fn set_list(mut self, list: Vec<T>) -> Self {
        self.list = Some(list);
        self
    }

    pub fn set_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    pub fn ok<M: Into<String>>(self, message: M) -> web::Json<JsonResponse<T>> {
        web::Json(JsonResponse {
            message: message.into(),
            item: self.item,
            list: self.list,
            token: self.token,
        })
    }
}

/// Body of every rejection: `reason` is a stable code a client can branch on.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: String,
    pub reason: &'a str,
}

pub fn error_response(status: StatusCode, reason: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody {
        error: message,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_skipped() {
        let body = JsonResponse::<String>::build().set_token("t".to_string()).ok("done");
        let json = serde_json::to_value(&body.0).unwrap();
        assert_eq!(json["message"], "done");
        assert_eq!(json["token"], "t");
        assert!(json.get("item").is_none());
        assert!(json.get("list").is_none());
    }
}
