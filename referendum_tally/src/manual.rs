/*!

This is the long-form manual for `referendum_tally` and `refmap`.

## Input files

Four files are read, by default from the `data` directory:

* `referendum.csv` the results of the referendum, one line per town
* `regions.csv` the list of regions
* `departments.csv` the list of departments and their region
* `regions.geojson` the outline of each region

### `referendum.csv`

Semicolon-separated, with a header line:

```text
Department code;Department name;Town code;Town name;Registered;Abstentions;Null;Choice A;Choice B
01;AIN;1;L'Abergement-Clémenciat;592;113;5;165;309
ZZ;FRANCAIS DE L'ETRANGER;1;Europe;1000;500;10;300;190
```

The department code may be written `01` or `1`. Lines with a purely alphabetic
department code (`ZA` to `ZZ`: overseas territories and the French living abroad)
are not part of the regional map and are dropped. Corsica (`2A`, `2B`) is kept.

### `regions.csv`

Comma-separated, the columns `code` and `name` are used:

```text
id,code,name,slug
1,01,Guadeloupe,guadeloupe
13,84,Auvergne-Rhône-Alpes,auvergne rhone alpes
```

### `departments.csv`

Comma-separated, the columns `region_code`, `code` and `name` are used:

```text
id,region_code,code,name,slug
1,84,01,Ain,ain
```

Every department must point to an existing region.

### `regions.geojson`

A feature collection, one feature per region with the properties `code` and `nom`
and a `Polygon` or `MultiPolygon` geometry. The results are matched to the features
by the region name (`nom`), which must be written exactly as in `regions.csv`.

## Code matching

Codes that are integers are compared by value (`01` is the same as `1`). Other
codes are compared as written.

## Output

For each region present in the mainland results, the sums of the counts and the ratio
`Choice A / (Choice A + Choice B)`. The ratio is undefined (`null` in the summary,
grey on the map) for a region where no ballot was cast for either choice.

The regions are sorted by name.

## Errors

The run stops at the first inconsistency in the reference data:
* a department referencing an unknown region
* a mainland line of the results referencing an unknown department
* a region of the results without an outline, or with more than one
* two departments or two regions with the same code
* counts of a region whose sum does not fit in 64 bits

The region code of the output is the one of the region table, whatever the padding
used by the departments.

*/
