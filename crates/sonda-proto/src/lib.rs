//! # sonda-proto
//!
//! Wire types for the simulated user-lifecycle API.
//!
//! The JSON field names are the contract: `usuarioId`, `erro`, `mensagem`,
//! `pedidos`. Both the mock backend and the flow runner serialize through
//! these types, so the two sides cannot drift apart.

use serde::{Deserialize, Serialize};

/// Registration request body for `POST /api/cadastro`.
///
/// Fields are optional so the backend can distinguish "absent" from
/// "present but empty" — both count as missing for validation purposes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CadastroRequest {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
    pub origem: Option<String>,
}

impl CadastroRequest {
    /// Returns true when all required fields (nome, email, senha) are
    /// present and non-empty. `origem` is informational only.
    pub fn required_fields_present(&self) -> bool {
        [&self.nome, &self.email, &self.senha]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.is_empty()))
    }
}

/// Successful registration response: the freshly generated identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CadastroResponse {
    pub usuario_id: u32,
}

/// Successful login/update response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MensagemResponse {
    pub mensagem: String,
}

/// Successful order-listing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedidosResponse {
    pub pedidos: Vec<Pedido>,
}

/// One order in the canned listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pedido {
    pub id: u32,
    pub valor: f64,
    pub data: String,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErroBody {
    pub erro: String,
}

impl ErroBody {
    pub fn new(erro: impl Into<String>) -> Self {
        Self { erro: erro.into() }
    }
}

/// The fixed order list returned by every successful listing call.
pub fn pedidos_fixos() -> Vec<Pedido> {
    vec![
        Pedido {
            id: 1,
            valor: 150.0,
            data: "2023-01-15".to_string(),
        },
        Pedido {
            id: 2,
            valor: 89.9,
            data: "2023-02-20".to_string(),
        },
        Pedido {
            id: 3,
            valor: 200.5,
            data: "2023-03-10".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usuario_id_serializes_camel_case() {
        let resp = CadastroResponse { usuario_id: 12345 };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"usuarioId":12345}"#);

        let back: CadastroResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, resp);
    }

    #[test]
    fn test_required_fields_reject_empty_and_absent() {
        let full = CadastroRequest {
            nome: Some("Usuário Teste".into()),
            email: Some("usuario@teste.com".into()),
            senha: Some("senha123".into()),
            origem: Some("teste-api".into()),
        };
        assert!(full.required_fields_present());

        let empty_senha = CadastroRequest {
            senha: Some(String::new()),
            ..full.clone()
        };
        assert!(!empty_senha.required_fields_present());

        let missing_senha = CadastroRequest {
            senha: None,
            ..full.clone()
        };
        assert!(!missing_senha.required_fields_present());

        // origem is optional
        let no_origem = CadastroRequest {
            origem: None,
            ..full
        };
        assert!(no_origem.required_fields_present());
    }

    #[test]
    fn test_fixed_order_list() {
        let pedidos = pedidos_fixos();
        assert_eq!(pedidos.len(), 3);
        assert_eq!(pedidos[0].id, 1);
        assert_eq!(pedidos[1].valor, 89.9);
        assert_eq!(pedidos[2].data, "2023-03-10");
    }

    #[test]
    fn test_erro_body_shape() {
        let body = ErroBody::new("Dados incompletos");
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"erro":"Dados incompletos"}"#);
    }
}
