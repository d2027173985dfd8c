//! # Definição de Erros do Pipeline
//!
//! Este módulo centraliza as falhas possíveis ao longo das etapas do ETL
//! (download, extração, leitura, agregação e gravação).
//!
//! # Error Handling Strategy
//! - **Tipagem:** Enum único para tratamento exaustivo no driver.
//! - **Extensibilidade:** Marcado como `non_exhaustive` para permitir evolução sem quebra de contrato.

/// Enumeração central de falhas do pipeline.
///
/// O atributo `#[non_exhaustive]` garante compatibilidade futura,
/// instruindo o compilador a exigir tratamento de variantes desconhecidas.
#[derive(Debug)]
#[non_exhaustive]
pub enum EtlError {
    /// Falhas no sistema de arquivos (permissão, disco cheio, arquivo inexistente).
    /// Encapsula `std::io::Error`.
    Io(std::io::Error),

    /// Falha na conexão HTTP ou status de erro retornado pelo servidor.
    /// Encapsula `reqwest::Error`.
    Http(reqwest::Error),

    /// O conteúdo baixado não é um container ZIP válido ou a extração falhou.
    /// Encapsula `zip::result::ZipError`.
    Archive(zip::result::ZipError),

    /// Erros originados na engine de dataframes (parse de schema, join, escrita Parquet).
    /// Armazenados como `String` para reduzir acoplamento direto.
    DataFrame(String),

    /// Falha de conectividade, autenticação ou execução no banco relacional.
    /// Armazenados como `String` para reduzir acoplamento direto.
    Database(String),

    /// Configuração ausente, malformada ou inconsistente.
    Config(String),
}
