//! # Leitura Tipada dos Arquivos Delimitados
//!
//! ## Visão Geral
//! Os arquivos da Receita não possuem cabeçalho: o contrato de colunas é
//! declarado aqui como schemas fixos e imposto no momento da leitura.
//! Qualquer linha que não respeite o tipo declarado é erro de leitura.
//!
//! Os arquivos originais são latin-1 com vírgula decimal, por isso a
//! leitura usa decodificação UTF-8 tolerante e parse decimal com vírgula.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use polars::io::SerReader;
use polars::prelude::*;

use crate::errors::EtlError;

/// Schema do registro de empresas (EMPRECSV).
pub fn schema_empresa() -> Schema {
    Schema::from_iter([
        Field::new("cnpj".into(), DataType::String),
        Field::new("razao_social".into(), DataType::String),
        Field::new("natureza_juridica".into(), DataType::Int32),
        Field::new("qualificacao_responsavel".into(), DataType::Int32),
        Field::new("capital_social".into(), DataType::Float64),
        Field::new("cod_porte".into(), DataType::String),
    ])
}

/// Schema do registro de sócios (SOCIOCSV).
pub fn schema_socio() -> Schema {
    Schema::from_iter([
        Field::new("cnpj".into(), DataType::String),
        Field::new("tipo_socio".into(), DataType::Int32),
        Field::new("nome_socio".into(), DataType::String),
        Field::new("documento_socio".into(), DataType::String),
        Field::new("codigo_qualificacao_socio".into(), DataType::String),
    ])
}

/// Lê um arquivo delimitado sem cabeçalho sob um schema declarado.
///
/// Acrescenta a coluna `timestamp` com o instante da ingestão (o mesmo
/// valor para todas as linhas desta invocação).
///
/// # Arguments
/// * `path` - Caminho do arquivo extraído na camada bronze.
/// * `delimiter` - Separador de campos (`;` nos arquivos da Receita).
/// * `schema` - Contrato de colunas (nome e tipo) imposto na leitura.
///
/// # Errors
/// Retorna `EtlError::DataFrame` se alguma linha violar o schema declarado
/// e `EtlError::Io` se o arquivo não puder ser aberto.
pub fn read_csv(path: &Path, delimiter: u8, schema: Schema) -> Result<DataFrame, EtlError> {
    let parse_options = CsvParseOptions::default()
        .with_separator(delimiter)
        .with_encoding(CsvEncoding::LossyUtf8)
        .with_decimal_comma(true);

    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_schema(Some(Arc::new(schema)))
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    with_ingestion_timestamp(df)
}

/// Acrescenta a coluna `timestamp` com o relógio de parede atual.
///
/// Compartilhada entre a leitura e a agregação: em ambas, todas as linhas
/// de uma mesma invocação recebem o mesmo carimbo (precisão de milissegundos).
pub fn with_ingestion_timestamp(mut df: DataFrame) -> Result<DataFrame, EtlError> {
    let agora = Utc::now().timestamp_millis();

    let carimbo = Series::new("timestamp".into(), vec![agora; df.height()])
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    df.with_column(carimbo)?;
    Ok(df)
}
