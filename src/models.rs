//! Modelos de Configuração do Pipeline
//!
//! ## Visão Geral
//! Este módulo define as estruturas de dados para a configuração do pipeline ETL.
//! Todos os parâmetros de execução (URLs dos arquivos da Receita, caminhos das
//! camadas bronze/silver e conexão com o banco relacional) vivem em um arquivo
//! TOML carregado na inicialização, nunca como constantes embutidas no código.
//!
//! ## Boas Práticas
//! - **Encapsulamento**: Validações de integridade ocorrem no momento da carga.
//! - **Fail-Fast**: Configuração inconsistente aborta antes de qualquer download.

use crate::errors::EtlError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuração raiz do pipeline.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub sources: SourcesConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
}

/// Fontes de dados abertos (um arquivo ZIP por registro).
#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    /// Registro de empresas (EMPRECSV).
    pub empresas: SourceConfig,

    /// Registro de sócios (SOCIOCSV).
    pub socios: SourceConfig,
}

/// Uma fonte individual: o ZIP remoto e o membro delimitado dentro dele.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// URL completa do arquivo ZIP (ex: https://dadosabertos.rfb.gov.br/CNPJ/Empresas1.zip).
    pub url: String,

    /// Nome do arquivo delimitado contido no ZIP.
    pub csv_file: String,
}

/// Camadas físicas de armazenamento local.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Destino da extração crua dos ZIPs.
    pub bronze_dir: PathBuf,

    /// Destino dos arquivos Parquet processados.
    pub silver_dir: PathBuf,
}

/// Conexão com o banco relacional de destino.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// String de conexão MySQL (ex: mysql://host:3306).
    pub url: String,

    pub user: String,
    pub password: String,

    /// Schema/database onde as tabelas serão sobrescritas.
    pub database: String,

    pub tables: TablesConfig,
}

/// Nomes das três tabelas de destino, sobrescritas a cada execução.
#[derive(Debug, Deserialize, Clone)]
pub struct TablesConfig {
    pub empresa: String,
    pub socio: String,
    pub empresa_socio: String,
}

impl Config {
    /// Carrega e valida o ficheiro de configuração TOML.
    ///
    /// # Erros
    /// Retorna `EtlError::Io` se o ficheiro não for encontrado ou
    /// `EtlError::Config` se a estrutura for inválida.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, EtlError> {
        let content = fs::read_to_string(path).map_err(EtlError::Io)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| EtlError::Config(format!("Erro no TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validação pós-carga (Fail-Fast).
    fn validate(&self) -> Result<(), EtlError> {
        for (nome, fonte) in [
            ("sources.empresas", &self.sources.empresas),
            ("sources.socios", &self.sources.socios),
        ] {
            if fonte.url.is_empty() {
                return Err(EtlError::Config(format!("'{}' sem url", nome)));
            }
            if fonte.csv_file.is_empty() {
                return Err(EtlError::Config(format!("'{}' sem csv_file", nome)));
            }
        }

        if self.database.url.is_empty() {
            return Err(EtlError::Config("'database' sem url".to_string()));
        }
        if self.database.database.is_empty() {
            return Err(EtlError::Config("'database' sem schema de destino".to_string()));
        }

        for (nome, tabela) in [
            ("tables.empresa", &self.database.tables.empresa),
            ("tables.socio", &self.database.tables.socio),
            ("tables.empresa_socio", &self.database.tables.empresa_socio),
        ] {
            if tabela.is_empty() {
                return Err(EtlError::Config(format!("'{}' vazio", nome)));
            }
        }

        Ok(())
    }

    /// Caminho do membro extraído de uma fonte dentro da camada bronze.
    pub fn bronze_csv_path(&self, source: &SourceConfig) -> PathBuf {
        self.storage.bronze_dir.join(&source.csv_file)
    }

    /// Caminho do Parquet de um dataset dentro da camada silver.
    pub fn silver_parquet_path(&self, dataset: &str) -> PathBuf {
        self.storage.silver_dir.join(format!("{}.parquet", dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_OK: &str = r#"
        [sources.empresas]
        url = "https://dadosabertos.rfb.gov.br/CNPJ/Empresas1.zip"
        csv_file = "K3241.K03200Y1.D40309.EMPRECSV"

        [sources.socios]
        url = "https://dadosabertos.rfb.gov.br/CNPJ/Socios1.zip"
        csv_file = "K3241.K03200Y1.D40309.SOCIOCSV"

        [storage]
        bronze_dir = "bronze"
        silver_dir = "silver"

        [database]
        url = "mysql://localhost:3306"
        user = "aluno"
        password = "aluno123"
        database = "ATIVIDADE"

        [database.tables]
        empresa = "empresa"
        socio = "socio"
        empresa_socio = "empresa_socio"
    "#;

    #[test]
    fn carrega_configuracao_valida() {
        let config: Config = toml::from_str(CONFIG_OK).unwrap();
        config.validate().unwrap();

        assert_eq!(config.sources.socios.csv_file, "K3241.K03200Y1.D40309.SOCIOCSV");
        assert_eq!(
            config.bronze_csv_path(&config.sources.empresas),
            PathBuf::from("bronze/K3241.K03200Y1.D40309.EMPRECSV")
        );
        assert_eq!(
            config.silver_parquet_path("empresa_socio"),
            PathBuf::from("silver/empresa_socio.parquet")
        );
    }

    #[test]
    fn rejeita_fonte_sem_url() {
        let quebrado = CONFIG_OK.replace(
            "url = \"https://dadosabertos.rfb.gov.br/CNPJ/Empresas1.zip\"",
            "url = \"\"",
        );
        let config: Config = toml::from_str(&quebrado).unwrap();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }

    #[test]
    fn rejeita_tabela_vazia() {
        let quebrado = CONFIG_OK.replace("socio = \"socio\"", "socio = \"\"");
        let config: Config = toml::from_str(&quebrado).unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn caminho_inexistente_e_erro_de_io() {
        let err = Config::load_from_file("caminho/que/nao/existe.toml").unwrap_err();
        assert!(matches!(err, EtlError::Io(_)));
    }

    #[test]
    fn rejeita_toml_malformado() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sources.empresas]\nurl = 1").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }
}
