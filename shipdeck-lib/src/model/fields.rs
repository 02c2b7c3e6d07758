//! Field names of the shipment and transport tables.
//!
//! Shipment fields are addressed by their camel-case names inside the
//! console and stored in snake-case columns; transport fields use the
//! column names directly.

use super::RecordKind;

pub const ID: &str = "id";
pub const UPDATED_AT: &str = "updated_at";

// -----------------------------------------------------------------------------
// Shipment (`registros`)
// -----------------------------------------------------------------------------

pub const REF_ASLI: &str = "refAsli";
pub const REF_CLIENTE: &str = "refCliente";
pub const EJECUTIVO: &str = "ejecutivo";
pub const SHIPPER: &str = "shipper";
pub const BOOKING: &str = "booking";
pub const CONTENEDOR: &str = "contenedor";
pub const NAVIERA: &str = "naviera";
pub const NAVE_INICIAL: &str = "naveInicial";
pub const VIAJE: &str = "viaje";
pub const ESPECIE: &str = "especie";
pub const TEMPERATURA: &str = "temperatura";
pub const CBM: &str = "cbm";
pub const CO2: &str = "co2";
pub const O2: &str = "o2";
pub const POL: &str = "pol";
pub const POD: &str = "pod";
pub const DEPOSITO: &str = "deposito";
pub const ETD: &str = "etd";
pub const ETA: &str = "eta";
pub const TT: &str = "tt";
pub const FLETE: &str = "flete";
pub const ESTADO: &str = "estado";
pub const TIPO_INGRESO: &str = "tipoIngreso";
pub const CONTRATO: &str = "contrato";
pub const COMENTARIO: &str = "comentario";
/// Display-only column that opens the change history.
pub const HISTORIAL: &str = "historial";

// -----------------------------------------------------------------------------
// Transport (`transportes`)
// -----------------------------------------------------------------------------

pub const SEMANA: &str = "semana";
pub const PLANTA: &str = "planta";
pub const STACKING: &str = "stacking";
pub const FIN_STACKING: &str = "fin_stacking";
pub const CUT_OFF: &str = "cut_off";
pub const FECHA_PLANTA: &str = "fecha_planta";
pub const CONDUCTOR: &str = "conductor";
pub const PATENTES: &str = "patentes";
pub const NAVE: &str = "nave";
pub const REGISTRO_ID: &str = "registro_id";
pub const TRANSPORT_REF_CLIENTE: &str = "ref_cliente";

/// Values of the shipment `estado` field.
pub mod status {
    pub const CONFIRMED: &str = "CONFIRMADO";
    pub const PENDING: &str = "PENDIENTE";
    pub const CANCELLED: &str = "CANCELADO";
}

/// Returns the store column for a console field name.
pub fn storage_column(kind: RecordKind, field: &str) -> String {
    match kind {
        RecordKind::Shipment => to_snake_case(field),
        RecordKind::Transport => field.to_string(),
    }
}

/// Returns the console field name for a store column.
pub fn console_field(kind: RecordKind, column: &str) -> String {
    match kind {
        RecordKind::Shipment => to_camel_case(column),
        RecordKind::Transport => column.to_string(),
    }
}

fn to_snake_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    let mut prev_lower_or_digit = false;
    for c in field.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower_or_digit {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower_or_digit = false;
        } else if c == ' ' || c == '-' {
            out.push('_');
            prev_lower_or_digit = false;
        } else {
            out.push(c);
            prev_lower_or_digit = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

fn to_camel_case(column: &str) -> String {
    let mut out = String::with_capacity(column.len());
    let mut upper_next = false;
    for c in column.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
