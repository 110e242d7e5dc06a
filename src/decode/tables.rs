// src/decode/tables.rs

/// Fixed code → label mapping for one categorical field.
pub type CodeTable = &'static [(&'static str, &'static str)];

pub const ACCOUNT_STATUS: CodeTable = &[
    ("A11", "< 0 DM (Sobregiro)"),
    ("A12", "0 - 200 DM (Bajo balance)"),
    ("A13", ">= 200 DM (Buen balance)"),
    ("A14", "Sin cuenta corriente"),
];

pub const CREDIT_HISTORY: CodeTable = &[
    ("A30", "Sin créditos / todos pagados"),
    ("A31", "Todos créditos pagados en este banco"),
    ("A32", "Créditos existentes pagados puntualmente"),
    ("A33", "Retraso en pagos pasados"),
    ("A34", "Cuenta crítica / créditos en otros bancos"),
];

pub const PURPOSE: CodeTable = &[
    ("A40", "Auto (Nuevo)"),
    ("A41", "Auto (Usado)"),
    ("A42", "Muebles/Equipamiento"),
    ("A43", "Radio/Televisión"),
    ("A44", "Electrodomésticos"),
    ("A45", "Reparaciones"),
    ("A46", "Educación"),
    ("A47", "Vacaciones"),
    ("A48", "Recapacitación"),
    ("A49", "Negocio"),
    ("A410", "Otros"),
];

pub const SAVINGS: CodeTable = &[
    ("A61", "< 100 DM"),
    ("A62", "100 - 500 DM"),
    ("A63", "500 - 1000 DM"),
    ("A64", ">= 1000 DM"),
    ("A65", "Sin cuenta de ahorro"),
];

pub const EMPLOYMENT_SINCE: CodeTable = &[
    ("A71", "Desempleado"),
    ("A72", "< 1 año"),
    ("A73", "1 - 4 años"),
    ("A74", "4 - 7 años"),
    ("A75", ">= 7 años"),
];

pub const PERSONAL_STATUS_SEX: CodeTable = &[
    ("A91", "Hombre - Divorciado/Separado"),
    ("A92", "Mujer - Divorciada/Separada/Casada"),
    ("A93", "Hombre - Soltero"),
    ("A94", "Hombre - Casado/Viudo"),
    ("A95", "Mujer - Soltera"),
];

pub const OTHER_DEBTORS: CodeTable = &[
    ("A101", "Ninguno"),
    ("A102", "Co-solicitante"),
    ("A103", "Garante"),
];

pub const PROPERTY: CodeTable = &[
    ("A121", "Bienes raíces"),
    ("A122", "Seguro de vida / Ahorro"),
    ("A123", "Auto u otros bienes"),
    ("A124", "Sin propiedad conocida"),
];

pub const OTHER_INSTALLMENT_PLANS: CodeTable = &[
    ("A141", "Banco"),
    ("A142", "Tiendas"),
    ("A143", "Ninguno"),
];

pub const HOUSING: CodeTable = &[
    ("A151", "Alquiler"),
    ("A152", "Propia"),
    ("A153", "Gratuita"),
];

pub const JOB: CodeTable = &[
    ("A171", "Desempleado / No calificado - No residente"),
    ("A172", "No calificado - Residente"),
    ("A173", "Empleado calificado"),
    ("A174", "Alta gerencia / Autónomo"),
];

pub const TELEPHONE: CodeTable = &[("A191", "No"), ("A192", "Sí")];

pub const FOREIGN_WORKER: CodeTable = &[("A201", "Sí"), ("A202", "No")];

pub fn lookup(table: CodeTable, code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}

pub fn is_label(table: CodeTable, value: &str) -> bool {
    table.iter().any(|(_, label)| *label == value)
}

/// The thirteen coded input columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoricalField {
    AccountStatus,
    CreditHistory,
    Purpose,
    Savings,
    EmploymentSince,
    PersonalStatusSex,
    OtherDebtors,
    Property,
    OtherInstallmentPlans,
    Housing,
    Job,
    Telephone,
    ForeignWorker,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 13] = [
        CategoricalField::AccountStatus,
        CategoricalField::CreditHistory,
        CategoricalField::Purpose,
        CategoricalField::Savings,
        CategoricalField::EmploymentSince,
        CategoricalField::PersonalStatusSex,
        CategoricalField::OtherDebtors,
        CategoricalField::Property,
        CategoricalField::OtherInstallmentPlans,
        CategoricalField::Housing,
        CategoricalField::Job,
        CategoricalField::Telephone,
        CategoricalField::ForeignWorker,
    ];

    /// Output column name.
    pub fn column(&self) -> &'static str {
        match self {
            CategoricalField::AccountStatus => "Status_Cuenta",
            CategoricalField::CreditHistory => "Historial_Crediticio",
            CategoricalField::Purpose => "Proposito",
            CategoricalField::Savings => "Cuenta_Ahorro",
            CategoricalField::EmploymentSince => "Empleo_Desde",
            CategoricalField::PersonalStatusSex => "Estado_Personal_Sexo",
            CategoricalField::OtherDebtors => "Otros_Deudores",
            CategoricalField::Property => "Propiedad",
            CategoricalField::OtherInstallmentPlans => "Otros_Planes_Cuota",
            CategoricalField::Housing => "Vivienda",
            CategoricalField::Job => "Trabajo",
            CategoricalField::Telephone => "Telefono",
            CategoricalField::ForeignWorker => "Extranjero",
        }
    }

    pub fn table(&self) -> CodeTable {
        match self {
            CategoricalField::AccountStatus => ACCOUNT_STATUS,
            CategoricalField::CreditHistory => CREDIT_HISTORY,
            CategoricalField::Purpose => PURPOSE,
            CategoricalField::Savings => SAVINGS,
            CategoricalField::EmploymentSince => EMPLOYMENT_SINCE,
            CategoricalField::PersonalStatusSex => PERSONAL_STATUS_SEX,
            CategoricalField::OtherDebtors => OTHER_DEBTORS,
            CategoricalField::Property => PROPERTY,
            CategoricalField::OtherInstallmentPlans => OTHER_INSTALLMENT_PLANS,
            CategoricalField::Housing => HOUSING,
            CategoricalField::Job => JOB,
            CategoricalField::Telephone => TELEPHONE,
            CategoricalField::ForeignWorker => FOREIGN_WORKER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique_per_table() {
        for field in CategoricalField::ALL {
            let codes: HashSet<_> = field.table().iter().map(|(c, _)| *c).collect();
            assert_eq!(codes.len(), field.table().len(), "{}", field.column());
        }
    }

    #[test]
    fn table_sizes() {
        assert_eq!(ACCOUNT_STATUS.len(), 4);
        assert_eq!(PURPOSE.len(), 11);
        assert_eq!(lookup(PURPOSE, "A410"), Some("Otros"));
        assert_eq!(lookup(PURPOSE, "A411"), None);
        assert!(is_label(HOUSING, "Propia"));
        assert!(!is_label(HOUSING, "A152"));
    }
}
