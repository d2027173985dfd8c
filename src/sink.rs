//! # Gravação dos Resultados
//!
//! ## Visão Geral
//! Dois destinos, ambos com semântica de sobrescrita total a cada execução:
//! - camada silver em Parquet (um arquivo por dataset);
//! - banco relacional MySQL (DROP/CREATE + INSERT em lote).
//!
//! A gravação relacional é assíncrona por baixo (`mysql_async`), mas exposta
//! de forma síncrona: o driver constrói o runtime Tokio e o passa por
//! referência, mantendo o sequenciamento bloqueante do pipeline.

use std::fs::{self, File};
use std::path::Path;

use chrono::{Datelike, Timelike};
use mysql_async::prelude::*;
use mysql_async::{Conn, Opts, OptsBuilder, Params};
use polars::prelude::*;
use tokio::runtime::Runtime;

use crate::errors::EtlError;
use crate::models::DatabaseConfig;

/* ========================================================================== */
/* Parquet                                                                    */
/* ========================================================================== */

/// Grava um dataset como Parquet, sobrescrevendo o destino.
///
/// # Errors
/// Retorna `EtlError::Io` se o destino não puder ser criado e
/// `EtlError::DataFrame` em falhas da engine durante a escrita.
pub fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), EtlError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // File::create trunca: execução anterior é sobrescrita
    let file_out = File::create(path)?;

    let stats_options = StatisticsOptions {
        min_value: true,
        max_value: true,
        null_count: true,
        distinct_count: false,
    };

    ParquetWriter::new(file_out)
        .with_compression(ParquetCompression::Snappy)
        .with_statistics(stats_options)
        .finish(df)?;

    println!("{} ok", path.display());

    Ok(())
}

/* ========================================================================== */
/* MySQL                                                                      */
/* ========================================================================== */

/// Grava um dataset como tabela MySQL, sobrescrevendo a tabela de destino.
///
/// # Arguments
/// * `runtime` - Runtime Tokio de posse do driver.
/// * `df` - Dataset a gravar.
/// * `config` - Parâmetros de conexão e schema de destino.
/// * `table` - Nome da tabela (não qualificado; o schema vem da conexão).
///
/// # Errors
/// Retorna `EtlError::Database` em falha de conectividade, autenticação ou
/// execução. Sem retry: a primeira falha aborta o pipeline.
pub fn write_database(
    runtime: &Runtime,
    df: &DataFrame,
    config: &DatabaseConfig,
    table: &str,
) -> Result<(), EtlError> {
    runtime.block_on(overwrite_table(df, config, table))?;

    println!("{} criada com sucesso", table);

    Ok(())
}

/// Sequência DROP -> CREATE -> INSERT em lote, com desconexão explícita.
async fn overwrite_table(df: &DataFrame, config: &DatabaseConfig, table: &str) -> Result<(), EtlError> {
    let opts = OptsBuilder::from_opts(
        Opts::from_url(&config.url)
            .map_err(|e| EtlError::Config(format!("String de conexão inválida: {}", e)))?,
    )
    .user(Some(&config.user))
    .pass(Some(&config.password))
    .db_name(Some(&config.database));

    let mut conn = Conn::new(opts).await?;

    conn.query_drop(format!("DROP TABLE IF EXISTS `{}`", table)).await?;
    conn.query_drop(create_table_sql(df, table)?).await?;

    conn.exec_batch(insert_sql(df, table), rows_as_params(df)?).await?;

    conn.disconnect().await?;

    Ok(())
}

/// Gera o DDL da tabela a partir do schema do dataset.
fn create_table_sql(df: &DataFrame, table: &str) -> Result<String, EtlError> {
    let mut colunas = Vec::with_capacity(df.width());

    for coluna in df.get_columns() {
        colunas.push(format!("`{}` {}", coluna.name(), sql_type(coluna.dtype())?));
    }

    Ok(format!("CREATE TABLE `{}` ({})", table, colunas.join(", ")))
}

/// Gera o INSERT posicional correspondente ao schema do dataset.
fn insert_sql(df: &DataFrame, table: &str) -> String {
    let nomes: Vec<String> = df
        .get_columns()
        .iter()
        .map(|c| format!("`{}`", c.name()))
        .collect();
    let marcadores = vec!["?"; df.width()].join(", ");

    format!(
        "INSERT INTO `{}` ({}) VALUES ({})",
        table,
        nomes.join(", "),
        marcadores
    )
}

/// Mapeia um tipo da engine para o tipo de coluna MySQL.
fn sql_type(dtype: &DataType) -> Result<&'static str, EtlError> {
    match dtype {
        DataType::String => Ok("TEXT"),
        DataType::Int32 => Ok("INT"),
        DataType::Int64 => Ok("BIGINT"),
        DataType::Float64 => Ok("DOUBLE"),
        DataType::Datetime(_, _) => Ok("DATETIME(3)"),
        outro => Err(EtlError::Database(format!(
            "Tipo sem mapeamento SQL: {}",
            outro
        ))),
    }
}

/// Materializa cada linha do dataset como parâmetros posicionais de INSERT.
fn rows_as_params(df: &DataFrame) -> Result<Vec<Params>, EtlError> {
    let mut linhas = Vec::with_capacity(df.height());

    for i in 0..df.height() {
        let mut valores = Vec::with_capacity(df.width());
        for coluna in df.get_columns() {
            valores.push(cell_to_sql(coluna.get(i)?)?);
        }
        linhas.push(Params::Positional(valores));
    }

    Ok(linhas)
}

/// Converte uma célula da engine para um valor MySQL.
fn cell_to_sql(valor: AnyValue) -> Result<mysql_async::Value, EtlError> {
    use mysql_async::Value;

    match valor {
        AnyValue::Null => Ok(Value::NULL),
        AnyValue::String(s) => Ok(Value::from(s)),
        AnyValue::StringOwned(s) => Ok(Value::from(s.as_str())),
        AnyValue::Int32(n) => Ok(Value::from(n)),
        AnyValue::Int64(n) => Ok(Value::from(n)),
        AnyValue::UInt32(n) => Ok(Value::from(n)),
        AnyValue::Float64(x) => Ok(Value::from(x)),
        AnyValue::Datetime(ms, TimeUnit::Milliseconds, _) => datetime_to_sql(ms),
        AnyValue::DatetimeOwned(ms, TimeUnit::Milliseconds, _) => datetime_to_sql(ms),
        outro => Err(EtlError::Database(format!(
            "Valor sem mapeamento SQL: {}",
            outro
        ))),
    }
}

/// Converte um carimbo em milissegundos para DATETIME MySQL.
fn datetime_to_sql(ms: i64) -> Result<mysql_async::Value, EtlError> {
    let dt = chrono::DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| EtlError::Database(format!("Carimbo fora do intervalo: {}", ms)))?
        .naive_utc();

    Ok(mysql_async::Value::Date(
        dt.year() as u16,
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
        dt.nanosecond() / 1000,
    ))
}
