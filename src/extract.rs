//! # Download e Extração dos Arquivos da Receita
//!
//! ## Visão Geral
//! Implementa a etapa bronze do pipeline: baixa cada ZIP de dados abertos
//! direto para o disco e extrai todos os membros no diretório de destino.
//! Sem retry e sem validação de checksum: o primeiro erro aborta a execução.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;

use crate::errors::EtlError;

/// Cria o cliente HTTP reutilizável do pipeline.
///
/// Reuso de conexões/Keep-alive entre os downloads das duas fontes.
pub fn create_http_client() -> Result<Client, EtlError> {
    let client = Client::builder().build()?;
    Ok(client)
}

/// Baixa o arquivo binário direto para o disco sem carregar na RAM.
///
/// Esta função utiliza `std::io::copy`, conectando o fluxo da internet
/// (Response) direto ao arquivo no disco (File) através de um buffer
/// interno pequeno. O tamanho do ZIP não pressiona a memória do processo.
///
/// # Arguments
/// * `client` - O cliente HTTP reutilizável.
/// * `url` - A URL completa do arquivo ZIP.
/// * `destino` - Onde salvar o arquivo cru (ex: "bronze/Empresas1.zip").
///
pub fn download_archive(client: &Client, url: &str, destino: &Path) -> Result<(), EtlError> {
    let mut response = client.get(url).send()?.error_for_status()?;

    let total_size = response.content_length().unwrap_or(0);
    let pb = ProgressBar::new(total_size);

    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    pb.set_message(format!("Baixando {}", destino.display()));

    let mut arquivo_destino = File::create(destino)?;

    // Stream: Rede -> Barra -> Disco
    let mut source = pb.wrap_read(&mut response);
    io::copy(&mut source, &mut arquivo_destino)?;

    pb.finish_with_message(format!("Download concluído: {}", destino.display()));

    Ok(())
}

/// Extrai todos os membros de um container ZIP para o diretório de destino.
///
/// # Erros
/// Retorna `EtlError::Archive` se o conteúdo não for um ZIP válido e
/// `EtlError::Io` em falhas de escrita dos membros.
pub fn extract_archive(zip_path: &Path, destino: &Path) -> Result<(), EtlError> {
    let arquivo = File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(arquivo)?;

    archive.extract(destino)?;

    Ok(())
}

/// Baixa um ZIP e extrai seu conteúdo na camada bronze.
///
/// O arquivo ZIP temporário é removido apenas após a extração bem-sucedida;
/// em caso de falha ele permanece no disco para inspeção.
pub fn fetch_and_extract(client: &Client, url: &str, destino: &Path) -> Result<(), EtlError> {
    let nome_zip = url.rsplit('/').next().unwrap_or("download.zip");
    let zip_path = destino.join(nome_zip);

    fs::create_dir_all(destino)?;

    download_archive(client, url, &zip_path)?;
    extract_archive(&zip_path, destino)?;

    fs::remove_file(&zip_path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn escreve_zip(path: &Path, membros: &[(&str, &[u8])]) {
        let arquivo = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(arquivo);
        let options = zip::write::SimpleFileOptions::default();

        for (nome, conteudo) in membros {
            writer.start_file(*nome, options).unwrap();
            writer.write_all(conteudo).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extrai_todos_os_membros_com_mesmo_conteudo() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("dados.zip");

        escreve_zip(
            &zip_path,
            &[
                ("EMPRECSV", b"\"1\";\"EMPRESA A\";\"2046\";\"10\";\"1000.00\";\"01\"\n".as_slice()),
                ("SOCIOCSV", b"\"1\";\"2\";\"FULANO\";\"***123\";\"49\"\n".as_slice()),
            ],
        );

        let destino = dir.path().join("bronze");
        extract_archive(&zip_path, &destino).unwrap();

        let empresa = fs::read(destino.join("EMPRECSV")).unwrap();
        let socio = fs::read(destino.join("SOCIOCSV")).unwrap();

        assert_eq!(empresa, b"\"1\";\"EMPRESA A\";\"2046\";\"10\";\"1000.00\";\"01\"\n");
        assert_eq!(socio, b"\"1\";\"2\";\"FULANO\";\"***123\";\"49\"\n");
    }

    #[test]
    fn rejeita_conteudo_que_nao_e_zip() {
        let dir = TempDir::new().unwrap();
        let falso = dir.path().join("nao_e_zip.zip");
        fs::write(&falso, b"conteudo qualquer").unwrap();

        let err = extract_archive(&falso, dir.path()).unwrap_err();
        assert!(matches!(err, EtlError::Archive(_)));
    }
}
