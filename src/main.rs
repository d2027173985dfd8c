//! # Pipeline CNPJ — Dados Abertos da Receita Federal
//!
//! ## Visão Geral
//! Extração dos registros de empresas e sócios do CNPJ, junção e sumarização
//! via Polars, e gravação nas camadas silver (Parquet) e relacional (MySQL).
//!
//! ## Princípios de Engenharia
//! - **Sequência fixa**: cada execução roda o pipeline inteiro do zero;
//!   destinos são sobrescritos, nunca incrementados.
//! - **Fail-Fast**: a primeira falha em qualquer etapa aborta a execução.
//! - **Observabilidade**: Logs com tempos de execução por etapa.

mod aggregate;
mod errors;
mod extract;
mod impl_errors;
mod models;
mod reader;
mod sink;

use std::env;
use std::fs;
use std::time::Instant;

use crate::models::Config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let global_timer = Instant::now();

    println!("--- INICIANDO PIPELINE CNPJ ---");

    // Carrega configuração TOML (permite passar caminho via CLI)
    let config_path = env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());

    let config = match Config::load_from_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Erro na carga de configuração: {}", e);
            std::process::exit(1);
        }
    };

    fs::create_dir_all(&config.storage.bronze_dir)?;
    fs::create_dir_all(&config.storage.silver_dir)?;

    // Recursos de sessão: construídos aqui, passados por referência às
    // etapas que os usam e descartados no fim do main.
    let client = extract::create_http_client()?;
    let runtime = tokio::runtime::Runtime::new()?;

    // Camada bronze: download e extração crua dos dois registros
    let step_timer = Instant::now();
    extract::fetch_and_extract(&client, &config.sources.socios.url, &config.storage.bronze_dir)?;
    extract::fetch_and_extract(&client, &config.sources.empresas.url, &config.storage.bronze_dir)?;
    println!("Extração concluída ({:.2?})", step_timer.elapsed());

    // Leitura tipada sob os schemas declarados
    let step_timer = Instant::now();
    let mut df_empresa = reader::read_csv(
        &config.bronze_csv_path(&config.sources.empresas),
        b';',
        reader::schema_empresa(),
    )?;
    let mut df_socio = reader::read_csv(
        &config.bronze_csv_path(&config.sources.socios),
        b';',
        reader::schema_socio(),
    )?;
    println!(
        "Leitura concluída: {} empresas, {} sócios ({:.2?})",
        df_empresa.height(),
        df_socio.height(),
        step_timer.elapsed()
    );

    // Sumarização empresa x sócio
    let mut df_final = aggregate::empresa_socio(&df_empresa, &df_socio)?;

    // Camada silver
    sink::write_parquet(&mut df_empresa, &config.silver_parquet_path("empresa"))?;
    sink::write_parquet(&mut df_socio, &config.silver_parquet_path("socio"))?;
    sink::write_parquet(&mut df_final, &config.silver_parquet_path("empresa_socio"))?;

    // Banco relacional
    sink::write_database(&runtime, &df_empresa, &config.database, &config.database.tables.empresa)?;
    sink::write_database(&runtime, &df_socio, &config.database, &config.database.tables.socio)?;
    sink::write_database(
        &runtime,
        &df_final,
        &config.database,
        &config.database.tables.empresa_socio,
    )?;

    println!("\n==========================================");
    println!("Fim do pipeline");
    println!(
        "Tempo de execução: {:.2?}",
        global_timer.elapsed()
    );
    println!("==========================================");

    Ok(())
}
