//! Column sets of the shipment and transport grids.

use shipdeck_lib::model::fields;

use super::CellFormat;
use super::ColumnDef;
use crate::edit::EditorKind;
use crate::edit::NumberBounds;
use crate::filter::FilterFn;

/// Catalog of loading plants.
pub const PLANT_CATALOG: &str = "plantas";

/// Arrival slots of export shipments.
pub const INTAKE_TYPES: [&str; 4] = ["NORMAL", "EARLY", "LATE", "EXTRA LATE"];

fn sized(column: ColumnDef, min: u32, max: u32) -> ColumnDef {
    column.min_width(min).max_width(max)
}

/// Columns of the shipment grid.
pub fn shipment_columns() -> Vec<ColumnDef> {
    let statuses = [
        fields::status::PENDING,
        fields::status::CONFIRMED,
        fields::status::CANCELLED,
    ];
    vec![
        sized(ColumnDef::field(fields::REF_ASLI, "REF ASLI").width(150), 150, 220),
        sized(
            ColumnDef::field(fields::REF_CLIENTE, "Ref Externa")
                .width(120)
                .editor(EditorKind::Text),
            120,
            200,
        ),
        sized(
            ColumnDef::field(fields::EJECUTIVO, "Ejecutivo")
                .editor(EditorKind::distinct())
                .filter(FilterFn::Exact),
            120,
            200,
        ),
        sized(
            ColumnDef::field(fields::SHIPPER, "Cliente").editor(EditorKind::distinct()),
            150,
            300,
        ),
        sized(
            ColumnDef::field(fields::BOOKING, "Booking").editor(EditorKind::Text),
            120,
            200,
        ),
        sized(
            ColumnDef::field(fields::CONTENEDOR, "Contenedor")
                .editor(EditorKind::MultiText)
                .format(CellFormat::List),
            100,
            250,
        ),
        sized(
            ColumnDef::field(fields::NAVIERA, "Naviera")
                .editor(EditorKind::distinct())
                .filter(FilterFn::Carrier),
            130,
            220,
        ),
        sized(
            ColumnDef::field(fields::NAVE_INICIAL, "Nave")
                .format(CellFormat::vessel(fields::VIAJE))
                .filter(FilterFn::Exact),
            130,
            220,
        ),
        sized(
            ColumnDef::field(fields::VIAJE, "Viaje").editor(EditorKind::Text),
            70,
            120,
        ),
        sized(
            ColumnDef::field(fields::POL, "POL").editor(EditorKind::distinct()),
            100,
            180,
        ),
        sized(
            ColumnDef::field(fields::POD, "POD").editor(EditorKind::distinct()),
            100,
            180,
        ),
        sized(
            ColumnDef::field(fields::ETD, "ETD")
                .editor(EditorKind::Date)
                .format(CellFormat::Date),
            80,
            120,
        ),
        sized(
            ColumnDef::field(fields::ETA, "ETA")
                .editor(EditorKind::Date)
                .format(CellFormat::Date),
            80,
            120,
        ),
        sized(
            ColumnDef::field(fields::TT, "TT").format(CellFormat::Number { unit: None }),
            50,
            80,
        ),
        sized(
            ColumnDef::field(fields::ESTADO, "Estado")
                .editor(EditorKind::options(statuses))
                .filter(FilterFn::Exact),
            100,
            150,
        ),
        sized(
            ColumnDef::field(fields::TIPO_INGRESO, "Tipo Ingreso")
                .editor(EditorKind::options(INTAKE_TYPES))
                .filter(FilterFn::Exact),
            100,
            180,
        ),
        sized(
            ColumnDef::field(fields::ESPECIE, "ESPECIE").editor(EditorKind::distinct()),
            90,
            180,
        ),
        sized(
            ColumnDef::field(fields::TEMPERATURA, "T°")
                .editor(EditorKind::bounded(NumberBounds::between(
                    -1.0,
                    1.0,
                    "La temperatura debe estar entre -1°C y 1°C",
                )))
                .format(CellFormat::unit("°C")),
            60,
            100,
        ),
        sized(
            ColumnDef::field(fields::CBM, "CBM")
                .editor(EditorKind::bounded(NumberBounds::at_least(
                    0.0,
                    "El CBM debe ser un valor positivo",
                )))
                .format(CellFormat::Number { unit: None }),
            50,
            90,
        ),
        sized(
            ColumnDef::field(fields::CO2, "CO2")
                .editor(percent())
                .format(CellFormat::unit("%")),
            50,
            90,
        ),
        sized(
            ColumnDef::field(fields::O2, "O2")
                .editor(percent())
                .format(CellFormat::unit("%")),
            50,
            90,
        ),
        sized(
            ColumnDef::field(fields::FLETE, "Flete").editor(EditorKind::distinct()),
            80,
            150,
        ),
        sized(
            ColumnDef::field(fields::DEPOSITO, "Depósito").editor(EditorKind::distinct()),
            100,
            180,
        ),
        sized(
            ColumnDef::field(fields::CONTRATO, "Contrato").editor(EditorKind::distinct()),
            180,
            350,
        ),
        sized(
            ColumnDef::field(fields::COMENTARIO, "Comentario").editor(EditorKind::Text),
            200,
            400,
        ),
        sized(
            ColumnDef::display(fields::HISTORIAL, "Historial").unresizable(),
            70,
            100,
        ),
        ColumnDef::field(fields::ID, "ID").unsortable(),
    ]
}

fn percent() -> EditorKind {
    EditorKind::bounded(NumberBounds::between(
        0.0,
        100.0,
        "El porcentaje debe estar entre 0% y 100%",
    ))
}

/// Columns of the transport grid.
pub fn transport_columns() -> Vec<ColumnDef> {
    let text = |id: &str, header: &str| ColumnDef::field(id, header).editor(EditorKind::Text);
    let when = |id: &str, header: &str| {
        ColumnDef::field(id, header)
            .editor(EditorKind::DateTime)
            .format(CellFormat::DateTime)
    };
    vec![
        ColumnDef::field(fields::SEMANA, "Semana")
            .editor(EditorKind::number())
            .format(CellFormat::Number { unit: None }),
        text("exportacion", "Export."),
        ColumnDef::field(fields::PLANTA, "Planta").editor(EditorKind::catalog(PLANT_CATALOG)),
        text(fields::DEPOSITO, "Depósito"),
        text(fields::BOOKING, "Booking"),
        text(fields::NAVE, "Nave"),
        text(fields::NAVIERA, "Naviera").filter(FilterFn::Carrier),
        when(fields::STACKING, "Stacking"),
        when(fields::FIN_STACKING, "Fin Stacking"),
        when(fields::CUT_OFF, "Cut Off"),
        ColumnDef::field("late", "Late").format(CellFormat::Bool),
        text(fields::CONTENEDOR, "Contenedor"),
        text("sello", "Sello"),
        ColumnDef::field("tara", "Tara")
            .editor(EditorKind::number())
            .format(CellFormat::Number { unit: None }),
        text(fields::ESPECIE, "Especie"),
        ColumnDef::field(fields::TEMPERATURA, "T°")
            .editor(EditorKind::number())
            .format(CellFormat::unit("°C")),
        text("vent", "Vent"),
        text(fields::POL, "POL"),
        text(fields::POD, "POD"),
        ColumnDef::field(fields::FECHA_PLANTA, "Fecha Planta")
            .editor(EditorKind::Date)
            .format(CellFormat::Date),
        ColumnDef::field("hora_presentacion", "Hora Presentación").editor(EditorKind::Time),
        text("guia_despacho", "Guía Despacho"),
        text("transportes", "Transportes"),
        text(fields::CONDUCTOR, "Conductor"),
        text("rut", "RUT"),
        text("fono", "Fono"),
        text(fields::PATENTES, "Patentes"),
        ColumnDef::field(fields::ID, "ID").unsortable(),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_column_ids_are_unique() {
        for columns in [shipment_columns(), transport_columns()] {
            let ids: HashSet<_> = columns.iter().map(|c| c.id.as_str()).collect();
            assert_eq!(ids.len(), columns.len());
        }
    }

    #[test]
    fn test_vessel_is_not_inline_editable() {
        let columns = shipment_columns();
        let vessel = columns.iter().find(|c| c.id == fields::NAVE_INICIAL).unwrap();
        assert!(!vessel.is_editable());
        let history = columns.iter().find(|c| c.id == fields::HISTORIAL).unwrap();
        assert!(!history.is_editable());
    }
}
