//! The closed set of canonical series names a dataset can be classified
//! into. Ported from the union of `MRSeriesRenameEnum`, `T1SeriesRenameEnum`,
//! `T2SeriesRenameEnum`, `ASLSEQSeriesRenameEnum`, `DSCSeriesRenameEnum` and
//! `CTSeriesRenameEnum` in the original enumeration module. Every variant's
//! [`SeriesVerdict::stem`] is the exact rename token the study/series folder
//! and NIfTI output file are named after.

macro_rules! verdict_enum {
    ($($variant:ident => $stem:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum SeriesVerdict {
            $($variant),+,
            /// No strategy matched; the series is archived but not renamed.
            Unclassified,
        }

        impl SeriesVerdict {
            /// The canonical rename token used to build a series' RenamePlan.
            pub fn stem(&self) -> &'static str {
                match self {
                    $(SeriesVerdict::$variant => $stem,)+
                    SeriesVerdict::Unclassified => "UNCLASSIFIED",
                }
            }
        }

        impl std::fmt::Display for SeriesVerdict {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.stem())
            }
        }
    };
}

verdict_enum! {
    // DWI / ADC / eADC
    Dwi0 => "DWI0",
    Dwi1000 => "DWI1000",
    Adc => "ADC",
    EAdc => "eADC",

    // SWAN / eSWAN
    Swan => "SWAN",
    SwanMip => "SWANmIP",
    SwanPhase => "SWANPHASE",
    ESwan => "eSWAN",
    ESwanMag => "eSWANmag",
    ESwanMip => "eSWANmIP",

    // MRA
    MraBrain => "MRA_BRAIN",
    MraNeck => "MRA_NECK",
    MraVrBrain => "MRAVR_BRAIN",
    MraVrNeck => "MRAVR_NECK",
    Mrv => "MRV",
    MrvSag => "MRV_SAG",

    // CVR / Resting / DTI
    Cvr => "CVR",
    Cvr1000 => "CVR1000",
    Cvr2000 => "CVR2000",
    Cvr2000Ear => "CVR2000_EAR",
    Cvr2000Eye => "CVR2000_EYE",
    Resting => "RESTING",
    Resting2000 => "RESTING2000",
    Dti32d => "DTI32D",
    Dti64d => "DTI64D",
    DscRaw => "DSC_RAW",

    // T1 family
    T1 => "T1",
    T1Axi => "T1_AXI",
    T1Cor => "T1_COR",
    T1Sag => "T1_SAG",
    T1Ce => "T1CE",
    T1CeAxi => "T1CE_AXI",
    T1CeCor => "T1CE_COR",
    T1CeSag => "T1CE_SAG",
    T1Flair => "T1FLAIR",
    T1FlairAxi => "T1FLAIR_AXI",
    T1FlairCor => "T1FLAIR_COR",
    T1FlairSag => "T1FLAIR_SAG",
    T1FlairCe => "T1FLAIRCE",
    T1FlairCeAxi => "T1FLAIRCE_AXI",
    T1FlairCeCor => "T1FLAIRCE_COR",
    T1FlairCeSag => "T1FLAIRCE_SAG",
    T1Cube => "T1CUBE",
    T1CubeAxi => "T1CUBE_AXI",
    T1CubeCor => "T1CUBE_COR",
    T1CubeSag => "T1CUBE_SAG",
    T1CubeCe => "T1CUBECE",
    T1CubeCeAxi => "T1CUBECE_AXI",
    T1CubeCeCor => "T1CUBECE_COR",
    T1CubeCeSag => "T1CUBECE_SAG",
    T1FlairCube => "T1FLAIRCUBE",
    T1FlairCubeAxi => "T1FLAIRCUBE_AXI",
    T1FlairCubeCor => "T1FLAIRCUBE_COR",
    T1FlairCubeSag => "T1FLAIRCUBE_SAG",
    T1FlairCubeCe => "T1FLAIRCUBECE",
    T1FlairCubeCeAxi => "T1FLAIRCUBECE_AXI",
    T1FlairCubeCeCor => "T1FLAIRCUBECE_COR",
    T1FlairCubeCeSag => "T1FLAIRCUBECE_SAG",
    T1Bravo => "T1BRAVO",
    T1BravoAxi => "T1BRAVO_AXI",
    T1BravoCeAxi => "T1BRAVOCE_AXI",
    T1BravoSag => "T1BRAVO_SAG",
    T1BravoCeSag => "T1BRAVOCE_SAG",
    T1BravoCor => "T1BRAVO_COR",
    T1BravoCeCor => "T1BRAVOCE_COR",
    T1CubeAxiR => "T1CUBE_AXIr",
    T1CubeCorR => "T1CUBE_CORr",
    T1CubeSagR => "T1CUBE_SAGr",
    T1CubeCeAxiR => "T1CUBECE_AXIr",
    T1CubeCeCorR => "T1CUBECE_CORr",
    T1CubeCeSagR => "T1CUBECE_SAGr",
    T1FlairCubeAxiR => "T1FLAIRCUBE_AXIr",
    T1FlairCubeCorR => "T1FLAIRCUBE_CORr",
    T1FlairCubeSagR => "T1FLAIRCUBE_SAGr",
    T1FlairCubeCeAxiR => "T1FLAIRCUBECE_AXIr",
    T1FlairCubeCeCorR => "T1FLAIRCUBECE_CORr",
    T1FlairCubeCeSagR => "T1FLAIRCUBECE_SAGr",
    T1BravoAxiR => "T1BRAVO_AXIr",
    T1BravoCeAxiR => "T1BRAVOCE_AXIr",
    T1BravoSagR => "T1BRAVO_SAGr",
    T1BravoCeSagR => "T1BRAVOCE_SAGr",
    T1BravoCorR => "T1BRAVO_CORr",
    T1BravoCeCorR => "T1BRAVOCE_CORr",

    // T2 family
    T2 => "T2",
    T2Axi => "T2_AXI",
    T2Cor => "T2_COR",
    T2Sag => "T2_SAG",
    T2Ce => "T2CE",
    T2CeAxi => "T2CE_AXI",
    T2CeCor => "T2CE_COR",
    T2CeSag => "T2CE_SAG",
    T2Flair => "T2FLAIR",
    T2FlairAxi => "T2FLAIR_AXI",
    T2FlairCor => "T2FLAIR_COR",
    T2FlairSag => "T2FLAIR_SAG",
    T2FlairCe => "T2FLAIRCE",
    T2FlairCeAxi => "T2FLAIRCE_AXI",
    T2FlairCeCor => "T2FLAIRCE_COR",
    T2FlairCeSag => "T2FLAIRCE_SAG",
    T2Cube => "T2CUBE",
    T2CubeAxi => "T2CUBE_AXI",
    T2CubeCor => "T2CUBE_COR",
    T2CubeSag => "T2CUBE_SAG",
    T2CubeCe => "T2CUBECE",
    T2CubeCeAxi => "T2CUBECE_AXI",
    T2CubeCeCor => "T2CUBECE_COR",
    T2CubeCeSag => "T2CUBECE_SAG",
    T2FlairCube => "T2FLAIRCUBE",
    T2FlairCubeAxi => "T2FLAIRCUBE_AXI",
    T2FlairCubeCor => "T2FLAIRCUBE_COR",
    T2FlairCubeSag => "T2FLAIRCUBE_SAG",
    T2FlairCubeCe => "T2FLAIRCUBECE",
    T2FlairCubeCeAxi => "T2FLAIRCUBECE_AXI",
    T2FlairCubeCeCor => "T2FLAIRCUBECE_COR",
    T2FlairCubeCeSag => "T2FLAIRCUBECE_SAG",
    T2CubeAxiR => "T2CUBE_AXIr",
    T2CubeCorR => "T2CUBE_CORr",
    T2CubeSagR => "T2CUBE_SAGr",
    T2CubeCeAxiR => "T2CUBECE_AXIr",
    T2CubeCeCorR => "T2CUBECE_CORr",
    T2CubeCeSagR => "T2CUBECE_SAGr",
    T2FlairCubeAxiR => "T2FLAIRCUBE_AXIr",
    T2FlairCubeCorR => "T2FLAIRCUBE_CORr",
    T2FlairCubeSagR => "T2FLAIRCUBE_SAGr",
    T2FlairCubeCeAxiR => "T2FLAIRCUBECE_AXIr",
    T2FlairCubeCeSagR => "T2FLAIRCUBECE_SAGr",
    T2FlairCubeCeCorR => "T2FLAIRCUBECE_CORr",

    // ASL
    AslSeq => "ASLSEQ",
    AslSeqAtt => "ASLSEQATT",
    AslSeqAttColor => "ASLSEQATT_COLOR",
    AslSeqCbf => "ASLSEQCBF",
    AslSeqCbfColor => "ASLSEQCBF_COLOR",
    AslProd => "ASLPROD",
    AslProdCbf => "ASLPRODCBF",
    AslProdCbfColor => "ASLPRODCBF_COLOR",
    AslSeqPw => "ASLSEQPW",

    // DSC
    Dsc => "DSC",
    DscRCbf => "DSCCBF_COLOR",
    DscRCbv => "DSCCBV_COLOR",
    DscMtt => "DSCMTT_COLOR",

    // CT (declared for the closed enumeration; no classification strategy
    // populates these yet — CT series are archived unclassified)
    Ncct5mm => "NCCT5mm",
    NcctCor => "NCCT_COR",
    NcctBone => "NCCTBONE",
    Cect5mm => "CECT5mm",
    Cta => "CTA",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_matches_original_token() {
        assert_eq!(SeriesVerdict::Dwi0.stem(), "DWI0");
        assert_eq!(SeriesVerdict::T1CubeCeSagR.stem(), "T1CUBECE_SAGr");
        assert_eq!(SeriesVerdict::Cvr2000Ear.stem(), "CVR2000_EAR");
    }
}
