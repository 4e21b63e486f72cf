// src/models/indication.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

// O frontend antigo circulava strings soltas ('aprovado', 'não aprovado'...).
// Aqui o status é um enum fechado: valor desconhecido é rejeitado na borda.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "indication_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IndicationStatus {
    Agendado, // Aguardando decisão do admin
    Aprovado, // Terminal: gera comissão
    Recusado, // Terminal
}

impl IndicationStatus {
    // Aprovado e recusado são terminais: não existe transição de saída.
    pub fn is_terminal(self) -> bool {
        matches!(self, IndicationStatus::Aprovado | IndicationStatus::Recusado)
    }
}

// Origem do lead. Classificação apenas, sem comportamento.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "lead_origin", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Website,
    Facebook,
    Instagram,
    Indicacao,
    Fixo,
    Whatsapp,
    Google,
    Outros,
}

impl Origin {
    pub fn label(self) -> &'static str {
        match self {
            Origin::Website => "Website",
            Origin::Facebook => "Facebook",
            Origin::Instagram => "Instagram",
            Origin::Indicacao => "Indicação",
            Origin::Fixo => "Fixo",
            Origin::Whatsapp => "WhatsApp",
            Origin::Google => "Google",
            Origin::Outros => "Outros",
        }
    }
}

// Segmento de atuação do cliente indicado. Quando `Outros`, o texto livre
// vai em `segment_other` na indicação.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "business_segment", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Saude,
    EducacaoPesquisa,
    Juridico,
    AdministracaoNegocios,
    Engenharias,
    TecnologiaInformacao,
    FinanceiroBancario,
    MarketingVendasComunicacao,
    IndustriaProducao,
    ConstrucaoCivil,
    TransportesLogistica,
    ComercioVarejo,
    TurismoHotelariaEventos,
    GastronomiaAlimentacao,
    AgronegocioMeioAmbiente,
    ArtesCulturaDesign,
    MidiasDigitaisCriativas,
    SegurancaDefesa,
    ServicosGerais,
    Outros,
}

impl Segment {
    pub fn label(self) -> &'static str {
        match self {
            Segment::Saude => "Saúde",
            Segment::EducacaoPesquisa => "Educação e Pesquisa",
            Segment::Juridico => "Jurídico",
            Segment::AdministracaoNegocios => "Administração e Negócios",
            Segment::Engenharias => "Engenharias",
            Segment::TecnologiaInformacao => "Tecnologia da Informação",
            Segment::FinanceiroBancario => "Financeiro e Bancário",
            Segment::MarketingVendasComunicacao => "Marketing, Vendas e Comunicação",
            Segment::IndustriaProducao => "Indústria e Produção",
            Segment::ConstrucaoCivil => "Construção Civil",
            Segment::TransportesLogistica => "Transportes e Logística",
            Segment::ComercioVarejo => "Comércio e Varejo",
            Segment::TurismoHotelariaEventos => "Turismo, Hotelaria e Eventos",
            Segment::GastronomiaAlimentacao => "Gastronomia e Alimentação",
            Segment::AgronegocioMeioAmbiente => "Agronegócio e Meio Ambiente",
            Segment::ArtesCulturaDesign => "Artes, Cultura e Design",
            Segment::MidiasDigitaisCriativas => "Mídias Digitais e Criativas",
            Segment::SegurancaDefesa => "Segurança e Defesa",
            Segment::ServicosGerais => "Serviços Gerais",
            Segment::Outros => "Outros",
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Indication {
    pub id: Uuid,

    // Dona da indicação. Imutável após a criação.
    pub ambassador_id: Uuid,

    #[schema(example = "João Pereira")]
    pub client_name: String,

    #[schema(example = "joao@email.com")]
    pub client_email: String,

    #[schema(example = "(11) 99999-9999")]
    pub client_phone: String,

    pub origin: Origin,
    pub segment: Segment,
    pub segment_other: Option<String>,

    pub observations: Option<String>,

    pub status: IndicationStatus,

    // Preenchida no momento da aprovação; âncora das datas das parcelas.
    pub approval_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agendado_nao_e_terminal() {
        assert!(!IndicationStatus::Agendado.is_terminal());
    }

    #[test]
    fn aprovado_e_recusado_sao_terminais() {
        assert!(IndicationStatus::Aprovado.is_terminal());
        assert!(IndicationStatus::Recusado.is_terminal());
    }
}
