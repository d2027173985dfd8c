//! # Sumarização Empresa x Sócio
//!
//! Junta o registro de empresas ao de sócios pelo CNPJ e produz a contagem
//! de sócios por empresa, com destaque para sócios estrangeiros.
//! Não havia nenhum registro com documento_socio '999'; pela documentação
//! oficial o tipo_socio 3 é estrangeiro.

use polars::prelude::*;

use crate::errors::EtlError;
use crate::reader::with_ingestion_timestamp;

/// Código de `tipo_socio` que identifica sócio estrangeiro.
const TIPO_SOCIO_ESTRANGEIRO: i32 = 3;

/// Expressão da flag de sócio estrangeiro: 1 quando `tipo_socio == 3`, senão 0.
///
/// `eq_missing` garante que um `tipo_socio` nulo (empresa sem sócio após o
/// left join) compare como falso e receba 0, não nulo.
pub fn flg_estrangeiro() -> Expr {
    when(col("tipo_socio").eq_missing(lit(TIPO_SOCIO_ESTRANGEIRO)))
        .then(lit(1i32))
        .otherwise(lit(0i32))
        .alias("flg_estrangeiro")
}

/// Sumariza os dados e gera a tabela empresa_socio.
///
/// Etapas: deriva a flag no registro de sócios, faz o left join empresa ->
/// sócio pelo CNPJ (empresas sem sócio permanecem com campos nulos),
/// recalcula a flag sobre o resultado (mesmo predicado, mesmo resultado) e
/// agrega por CNPJ:
/// - `qtde_socios`: contagem de linhas do grupo;
/// - `qtde_socios_estrangeiros`: soma da flag.
///
/// Uma empresa sem nenhum sócio aparece com `qtde_socios = 1` (a linha nula
/// do join é contada) e `qtde_socios_estrangeiros = 0`.
///
/// A saída é ordenada por CNPJ e recebe o carimbo de ingestão.
pub fn empresa_socio(df_empresa: &DataFrame, df_socio: &DataFrame) -> Result<DataFrame, EtlError> {
    let socios = df_socio.clone().lazy().with_column(flg_estrangeiro());

    let df_final = df_empresa
        .clone()
        .lazy()
        .join(socios, [col("cnpj")], [col("cnpj")], JoinArgs::new(JoinType::Left))
        .with_column(flg_estrangeiro())
        .group_by([col("cnpj")])
        .agg([
            len().cast(DataType::Int64).alias("qtde_socios"),
            col("flg_estrangeiro")
                .sum()
                .cast(DataType::Int64)
                .alias("qtde_socios_estrangeiros"),
        ])
        .sort(["cnpj"], Default::default())
        .collect()?;

    with_ingestion_timestamp(df_final)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coluna_i64(df: &DataFrame, nome: &str) -> Vec<Option<i64>> {
        df.column(nome).unwrap().i64().unwrap().into_iter().collect()
    }

    #[test]
    fn flag_marca_somente_tipo_3() {
        let df = df!(
            "cnpj" => ["1", "1", "2", "2"],
            "tipo_socio" => [1i32, 3, 2, 3],
        )
        .unwrap();

        let com_flag = df.lazy().with_column(flg_estrangeiro()).collect().unwrap();
        let flags: Vec<Option<i32>> = com_flag
            .column("flg_estrangeiro")
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .collect();

        assert_eq!(flags, [Some(0), Some(1), Some(0), Some(1)]);
    }

    #[test]
    fn flag_e_idempotente() {
        let df = df!(
            "cnpj" => ["1", "2"],
            "tipo_socio" => [3i32, 1],
        )
        .unwrap();

        let uma_vez = df.clone().lazy().with_column(flg_estrangeiro()).collect().unwrap();
        let duas_vezes = uma_vez
            .clone()
            .lazy()
            .with_column(flg_estrangeiro())
            .collect()
            .unwrap();

        assert!(uma_vez.equals(&duas_vezes));
    }

    #[test]
    fn agrega_contagens_por_cnpj() {
        let df_empresa = df!("cnpj" => ["1", "2"]).unwrap();
        let df_socio = df!(
            "cnpj" => ["1", "1", "2"],
            "tipo_socio" => [1i32, 3, 3],
        )
        .unwrap();

        let saida = empresa_socio(&df_empresa, &df_socio).unwrap();

        let cnpjs: Vec<Option<&str>> = saida.column("cnpj").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(cnpjs, [Some("1"), Some("2")]);
        assert_eq!(coluna_i64(&saida, "qtde_socios"), [Some(2), Some(1)]);
        assert_eq!(coluna_i64(&saida, "qtde_socios_estrangeiros"), [Some(1), Some(1)]);

        // a agregação recebe seu próprio carimbo de ingestão
        assert!(saida.column("timestamp").is_ok());
    }

    #[test]
    fn empresa_sem_socio_permanece_na_saida() {
        let df_empresa = df!("cnpj" => ["1", "2", "3"]).unwrap();
        let df_socio = df!(
            "cnpj" => ["1", "2"],
            "tipo_socio" => [3i32, 1],
        )
        .unwrap();

        let saida = empresa_socio(&df_empresa, &df_socio).unwrap();

        assert_eq!(saida.height(), 3);

        // a linha nula do left join conta como 1, nunca como estrangeiro
        assert_eq!(coluna_i64(&saida, "qtde_socios"), [Some(1), Some(1), Some(1)]);
        assert_eq!(
            coluna_i64(&saida, "qtde_socios_estrangeiros"),
            [Some(1), Some(0), Some(0)]
        );
    }
}
